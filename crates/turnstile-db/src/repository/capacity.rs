//! # Capacity Repository
//!
//! Event, tier and seat configuration - the Capacity Source.
//!
//! The reservation core treats this data as read-only: it is written by
//! event-setup tooling (and the seed binary / tests here), and every change
//! to an event's ceiling is recorded in the inventory audit log.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::counts;
use turnstile_core::{CapacityRecord, EventRecord, InventoryAction, SeatRef, UnitKind};

/// Repository for event capacity configuration.
#[derive(Debug, Clone)]
pub struct CapacityRepository {
    pool: SqlitePool,
}

impl CapacityRepository {
    /// Creates a new CapacityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CapacityRepository { pool }
    }

    /// Creates an event. `total_capacity` is the optional event-level
    /// ceiling; `None` means the aggregate is the sum of unit capacities.
    pub async fn create_event(
        &self,
        name: &str,
        total_capacity: Option<i64>,
    ) -> DbResult<EventRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %name, "Creating event");

        sqlx::query(
            r#"
            INSERT INTO events (id, name, total_capacity, lock_generation, created_at, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4, ?4)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(total_capacity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(EventRecord {
            id,
            name: name.to_string(),
            total_capacity,
            created_at: now,
        })
    }

    /// Gets an event by ID.
    pub async fn get_event(&self, event_id: &str) -> DbResult<Option<EventRecord>> {
        let mut conn = self.pool.acquire().await?;
        let row = counts::event_row(&mut conn, event_id).await?;

        Ok(row.map(|r| EventRecord {
            id: r.id,
            name: r.name,
            total_capacity: r.total_capacity,
            created_at: r.created_at,
        }))
    }

    /// Changes an event's overall ceiling, recording before/after in the
    /// inventory log.
    pub async fn set_event_capacity(
        &self,
        event_id: &str,
        total_capacity: Option<i64>,
        actor: &str,
        reason: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let before: Option<Option<i64>> =
            sqlx::query_scalar("SELECT total_capacity FROM events WHERE id = ?1")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(before) = before else {
            return Err(DbError::not_found("Event", event_id));
        };

        sqlx::query("UPDATE events SET total_capacity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(event_id)
            .bind(total_capacity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO inventory_log
                (id, event_id, action, unit_id, before_value, after_value, actor, reason, created_at)
            VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(event_id)
        .bind(InventoryAction::CapacityChange)
        .bind(before)
        .bind(total_capacity)
        .bind(actor)
        .bind(reason)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(event_id, ?total_capacity, actor, "Event ceiling changed");
        Ok(())
    }

    /// Creates a GA tier. The tier id doubles as the unit id.
    pub async fn create_tier(
        &self,
        event_id: &str,
        tier_id: &str,
        name: &str,
        capacity: i64,
    ) -> DbResult<CapacityRecord> {
        let now = Utc::now();

        debug!(event_id, tier_id, capacity, "Creating ticket tier");

        sqlx::query(
            r#"
            INSERT INTO ticket_tiers (id, event_id, name, capacity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(tier_id)
        .bind(event_id)
        .bind(name)
        .bind(capacity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(CapacityRecord {
            event_id: event_id.to_string(),
            unit_id: tier_id.to_string(),
            kind: UnitKind::Ga,
            capacity,
        })
    }

    /// Registers reserved seats for an event (capacity 1 each).
    pub async fn create_seats(&self, event_id: &str, seats: &[SeatRef]) -> DbResult<()> {
        debug!(event_id, count = seats.len(), "Creating seats");

        let mut tx = self.pool.begin().await?;
        for seat in seats {
            sqlx::query(
                r#"
                INSERT INTO seats (event_id, section_id, row_label, seat_number, unit_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(event_id)
            .bind(&seat.section_id)
            .bind(&seat.row)
            .bind(&seat.number)
            .bind(seat.seat_id())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Capacity records for an event's GA tiers.
    pub async fn tiers(&self, event_id: &str) -> DbResult<Vec<CapacityRecord>> {
        let mut conn = self.pool.acquire().await?;
        let caps = counts::tier_capacities(&mut conn, event_id).await?;

        let mut records: Vec<CapacityRecord> = caps
            .into_iter()
            .map(|(unit_id, capacity)| CapacityRecord {
                event_id: event_id.to_string(),
                unit_id,
                kind: UnitKind::Ga,
                capacity,
            })
            .collect();
        records.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));

        Ok(records)
    }

    /// Capacity records for an event's reserved seats (always capacity 1).
    pub async fn seats(&self, event_id: &str) -> DbResult<Vec<CapacityRecord>> {
        let mut conn = self.pool.acquire().await?;
        let unit_ids = counts::seat_unit_ids(&mut conn, event_id).await?;

        let mut records: Vec<CapacityRecord> = unit_ids
            .into_iter()
            .map(|unit_id| CapacityRecord {
                event_id: event_id.to_string(),
                unit_id,
                kind: UnitKind::Reserved,
                capacity: 1,
            })
            .collect();
        records.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));

        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
