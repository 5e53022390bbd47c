//! # Shared Count Queries
//!
//! The availability formula reads four quantities per unit: capacity, sold,
//! blocked and live-held. The Availability Calculator reads them as a
//! snapshot; the Hold Manager re-reads them inside its write-locked
//! transaction. Both go through these functions, on whatever connection
//! they hold, so the definitions cannot drift apart.
//!
//! Everything here takes `&mut SqliteConnection`: callers decide whether
//! that connection is inside a transaction.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::warn;

use crate::error::DbResult;
use turnstile_core::SeatRef;

/// The event row fields the reservation core cares about.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct EventRow {
    pub id: String,
    pub name: String,
    pub total_capacity: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Fetches the event row, or `None` if the event is unknown.
pub(crate) async fn event_row(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> DbResult<Option<EventRow>> {
    let row = sqlx::query_as::<_, EventRow>(
        "SELECT id, name, total_capacity, created_at FROM events WHERE id = ?1",
    )
    .bind(event_id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Configured GA tier capacities, keyed by unit id (= tier id).
pub(crate) async fn tier_capacities(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> DbResult<HashMap<String, i64>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT id, capacity FROM ticket_tiers WHERE event_id = ?1",
    )
    .bind(event_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().collect())
}

/// The set of configured seat unit ids for an event.
pub(crate) async fn seat_unit_ids(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> DbResult<HashSet<String>> {
    let rows =
        sqlx::query_as::<_, (String,)>("SELECT unit_id FROM seats WHERE event_id = ?1")
            .bind(event_id)
            .fetch_all(conn)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// One finalized order line, still in whichever addressing scheme the order
/// used.
#[derive(Debug, sqlx::FromRow)]
struct SoldLineRow {
    ticket_tier_id: Option<String>,
    section_id: Option<String>,
    row_label: Option<String>,
    seat_number: Option<String>,
    quantity: i64,
}

/// Sold counts per unit id, derived from finalized orders.
///
/// Order lines address GA units by tier id and reserved units by seat
/// coordinates; both are reconciled here into the canonical unit-id space
/// via [`SeatRef::seat_id`].
pub(crate) async fn sold_by_unit(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> DbResult<HashMap<String, i64>> {
    let rows = sqlx::query_as::<_, SoldLineRow>(
        r#"
        SELECT
            oi.ticket_tier_id,
            oi.section_id,
            oi.row_label,
            oi.seat_number,
            oi.quantity
        FROM order_items oi
        INNER JOIN orders o ON o.id = oi.order_id
        WHERE o.event_id = ?1
          AND o.status IN ('completed', 'confirmed')
        "#,
    )
    .bind(event_id)
    .fetch_all(conn)
    .await?;

    let mut sold: HashMap<String, i64> = HashMap::new();
    for row in rows {
        let unit_id = match (&row.ticket_tier_id, &row.section_id, &row.row_label, &row.seat_number)
        {
            (Some(tier_id), _, _, _) => tier_id.clone(),
            (None, Some(section), Some(row_label), Some(number)) => {
                SeatRef::new(section.clone(), row_label.clone(), number.clone()).seat_id()
            }
            _ => {
                warn!(event_id, "Skipping order line with no unit address");
                continue;
            }
        };
        *sold.entry(unit_id).or_insert(0) += row.quantity;
    }

    Ok(sold)
}

/// Admin-blocked quantities per unit id.
pub(crate) async fn blocked_by_unit(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> DbResult<HashMap<String, i64>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT unit_id, SUM(quantity)
        FROM admin_blocks
        WHERE event_id = ?1
        GROUP BY unit_id
        "#,
    )
    .bind(event_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Live-held quantities per unit id at `now`.
///
/// `exclude_session` drops one session's own holds from the view: during
/// Reserve, that session's prior holds are about to be replaced and must not
/// count against it.
pub(crate) async fn held_by_unit(
    conn: &mut SqliteConnection,
    event_id: &str,
    now: DateTime<Utc>,
    exclude_session: Option<&str>,
) -> DbResult<HashMap<String, i64>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT unit_id, SUM(quantity)
        FROM holds
        WHERE event_id = ?1
          AND held_until > ?2
          AND (?3 IS NULL OR session_id <> ?3)
        GROUP BY unit_id
        "#,
    )
    .bind(event_id)
    .bind(now)
    .bind(exclude_session)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().collect())
}
