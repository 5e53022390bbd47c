//! Seeds a demo event into a Turnstile database.
//!
//! ```bash
//! TURNSTILE_DATABASE_PATH=./turnstile.db cargo run -p turnstile-db --bin seed
//! ```
//!
//! Creates one event with a GA tier, a small seat grid, a couple of
//! finalized orders and an admin block, so the server has something to
//! serve out of the box. Running it twice creates a second event; it never
//! mutates existing rows.

use anyhow::{Context, Result};
use tracing::info;

use turnstile_core::{OrderStatus, ReserveLine, SeatRef, SellableUnit};
use turnstile_db::{BlockSpec, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::var("TURNSTILE_DATABASE_PATH")
        .unwrap_or_else(|_| "./turnstile.db".to_string());

    let db = Database::new(DbConfig::new(&path))
        .await
        .context("opening database")?;

    let event = db
        .capacity()
        .create_event("Turnstile Demo Night", Some(120))
        .await
        .context("creating event")?;
    info!(event_id = %event.id, "Created demo event");

    db.capacity()
        .create_tier(&event.id, "tier-ga", "General Admission", 100)
        .await
        .context("creating GA tier")?;

    // Two rows of ten in the balcony.
    let mut seats = Vec::new();
    for row in ["1", "2"] {
        for number in 1..=10 {
            seats.push(SeatRef::new("balcony", row, number.to_string()));
        }
    }
    db.capacity()
        .create_seats(&event.id, &seats)
        .await
        .context("creating seats")?;

    // A little history so availability isn't a wall of zeros.
    db.orders()
        .record_order(
            &event.id,
            OrderStatus::Completed,
            &[ReserveLine::new(SellableUnit::tier("tier-ga"), 12)],
        )
        .await
        .context("recording GA order")?;
    db.orders()
        .record_order(
            &event.id,
            OrderStatus::Confirmed,
            &[
                ReserveLine::new(SellableUnit::seat(SeatRef::new("balcony", "1", "1")), 1),
                ReserveLine::new(SellableUnit::seat(SeatRef::new("balcony", "1", "2")), 1),
            ],
        )
        .await
        .context("recording seat order")?;

    db.blocks()
        .block(
            &event.id,
            &[BlockSpec::new(
                SellableUnit::seat(SeatRef::new("balcony", "2", "10")),
                1,
            )],
            Some("house seat"),
            "seed",
        )
        .await
        .context("creating admin block")?;

    let snapshot = db
        .availability()
        .event_availability(&event.id)
        .await
        .context("reading back availability")?;
    info!(
        event_id = %event.id,
        total_capacity = snapshot.total_capacity,
        total_available = snapshot.total_available,
        units = snapshot.units.len(),
        "Seed complete"
    );
    println!("Seeded event {} into {path}", event.id);

    db.close().await;
    Ok(())
}
