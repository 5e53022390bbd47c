//! # Availability Repository (the Availability Calculator)
//!
//! Read-side snapshots: the per-event availability breakdown and the seat
//! map. Both are single-connection reads with no locking; they derive
//! liveness from `held_until` so an overdue sweep can never inflate the
//! numbers. A snapshot may go stale the moment it is returned, which is why
//! Reserve never trusts it and re-derives everything under the write lock.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::counts;
use turnstile_core::{EventAvailability, UnitAvailability, UnitKind};

/// A seat-level view of an event for seat-picker UIs.
///
/// Seats absent from all three lists are selectable. `held_seats` never
/// includes the viewing session's own holds; those are in `my_holds`.
#[derive(Debug, Clone, Default)]
pub struct SeatMap {
    /// Seat ids sold through finalized orders.
    pub sold_seats: Vec<String>,
    /// Seat ids live-held by other sessions, plus admin-blocked seats.
    pub held_seats: Vec<String>,
    /// Seat ids live-held by the viewing session.
    pub my_holds: Vec<String>,
}

/// Repository for availability reads.
#[derive(Debug, Clone)]
pub struct AvailabilityRepository {
    pool: SqlitePool,
}

impl AvailabilityRepository {
    /// Creates a new AvailabilityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AvailabilityRepository { pool }
    }

    /// Full availability breakdown for an event: every configured unit with
    /// its capacity / sold / blocked / held counts, plus the aggregate
    /// capped by the event ceiling.
    pub async fn event_availability(&self, event_id: &str) -> DbResult<EventAvailability> {
        let now = Utc::now();
        let mut conn = self.pool.acquire().await?;

        let event = counts::event_row(&mut conn, event_id)
            .await?
            .ok_or_else(|| DbError::not_found("Event", event_id))?;

        let tiers = counts::tier_capacities(&mut conn, event_id).await?;
        let seats = counts::seat_unit_ids(&mut conn, event_id).await?;
        let sold = counts::sold_by_unit(&mut conn, event_id).await?;
        let blocked = counts::blocked_by_unit(&mut conn, event_id).await?;
        let held = counts::held_by_unit(&mut conn, event_id, now, None).await?;

        let count_for = |map: &std::collections::HashMap<String, i64>, unit_id: &str| -> i64 {
            map.get(unit_id).copied().unwrap_or(0)
        };

        let mut units: Vec<UnitAvailability> = Vec::with_capacity(tiers.len() + seats.len());
        for (unit_id, capacity) in &tiers {
            units.push(UnitAvailability::compute(
                unit_id.clone(),
                UnitKind::Ga,
                *capacity,
                count_for(&sold, unit_id),
                count_for(&blocked, unit_id),
                count_for(&held, unit_id),
            ));
        }
        for unit_id in &seats {
            units.push(UnitAvailability::compute(
                unit_id.clone(),
                UnitKind::Reserved,
                1,
                count_for(&sold, unit_id),
                count_for(&blocked, unit_id),
                count_for(&held, unit_id),
            ));
        }
        units.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));

        debug!(event_id, units = units.len(), "Availability snapshot computed");
        Ok(EventAvailability::aggregate(
            event.id,
            event.total_capacity,
            units,
        ))
    }

    /// Seat map for an event. With a `session_id`, that session's own live
    /// holds are reported separately as `my_holds` instead of blending into
    /// the unavailable set.
    pub async fn seat_map(
        &self,
        event_id: &str,
        session_id: Option<&str>,
    ) -> DbResult<SeatMap> {
        let now = Utc::now();
        let mut conn = self.pool.acquire().await?;

        if counts::event_row(&mut conn, event_id).await?.is_none() {
            return Err(DbError::not_found("Event", event_id));
        }

        let seats = counts::seat_unit_ids(&mut conn, event_id).await?;
        let sold = counts::sold_by_unit(&mut conn, event_id).await?;
        let blocked = counts::blocked_by_unit(&mut conn, event_id).await?;
        let held_others = counts::held_by_unit(&mut conn, event_id, now, session_id).await?;

        let mut map = SeatMap::default();
        for unit_id in &seats {
            if sold.get(unit_id).copied().unwrap_or(0) > 0 {
                map.sold_seats.push(unit_id.clone());
            } else if held_others.get(unit_id).copied().unwrap_or(0) > 0
                || blocked.get(unit_id).copied().unwrap_or(0) > 0
            {
                map.held_seats.push(unit_id.clone());
            }
        }

        if let Some(session_id) = session_id {
            let mine = sqlx::query_as::<_, (String,)>(
                r#"
                SELECT h.unit_id
                FROM holds h
                INNER JOIN seats s ON s.event_id = h.event_id AND s.unit_id = h.unit_id
                WHERE h.event_id = ?1 AND h.session_id = ?2 AND h.held_until > ?3
                "#,
            )
            .bind(event_id)
            .bind(session_id)
            .bind(now)
            .fetch_all(&mut *conn)
            .await?;
            map.my_holds = mine.into_iter().map(|(id,)| id).collect();
        }

        map.sold_seats.sort();
        map.held_seats.sort();
        map.my_holds.sort();
        Ok(map)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
