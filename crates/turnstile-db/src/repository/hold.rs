//! # Hold Repository (the Hold Manager)
//!
//! Creates, renews and releases the short-lived holds that tie inventory to
//! a checkout session, and sweeps the ones that expired.
//!
//! ## The Reserve Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reserve(event, session, lines)                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. UPDATE events SET lock_generation += 1   ← takes the write lock  │
//! │       (0 rows → event not found)                  BEFORE any read      │
//! │    2. Re-derive sold / blocked / live-held                              │
//! │       (this session's own holds excluded - they get replaced)           │
//! │    3. Per unit: requested > available? → collect conflict (no           │
//! │       short-circuit, report them all)                                   │
//! │    4. Event ceiling check on the aggregate                              │
//! │    5. Any conflicts → ROLLBACK, return them (no partial holds)          │
//! │    6. DELETE this session's prior holds for the event                   │
//! │    7. INSERT one hold per line, held_until = now + duration             │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite admits one writer at a time, so step 1 serializes every Reserve
//! against every other Reserve: the read in step 2 can never be stale by
//! commit time. A contending transaction waits out the busy timeout and
//! then surfaces SQLITE_BUSY, which is retried here a bounded number of
//! times before becoming a transient error.
//!
//! Release and the expiry sweep are plain deletes: both are idempotent and
//! commute with each other and with Reserve, because Reserve re-reads under
//! the write lock and liveness is always re-derived from `held_until`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::counts;
use turnstile_core::{validation, Hold, ReserveLine, UnitConflict, UnitKind};

/// How many times Reserve retries a SQLITE_BUSY abort before giving up and
/// surfacing a transient error.
pub const RESERVE_MAX_ATTEMPTS: u32 = 3;

/// Outcome of a reservation attempt.
///
/// A conflict is a normal outcome, not an error: the caller gets the full
/// itemized list, with availability as computed at decision time.
#[derive(Debug, Clone)]
pub enum ReserveOutcome {
    /// All lines were held; the previous holds of this session for the
    /// event were replaced.
    Reserved {
        holds: Vec<Hold>,
        held_until: DateTime<Utc>,
    },
    /// At least one line could not be satisfied; nothing was held.
    /// An event-ceiling conflict is reported with the event id as its
    /// `unit_id`.
    Rejected { conflicts: Vec<UnitConflict> },
}

impl ReserveOutcome {
    pub fn is_reserved(&self) -> bool {
        matches!(self, ReserveOutcome::Reserved { .. })
    }
}

/// Repository for hold operations.
#[derive(Debug, Clone)]
pub struct HoldRepository {
    pool: SqlitePool,
}

impl HoldRepository {
    /// Creates a new HoldRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HoldRepository { pool }
    }

    /// Reserves the requested units for a session, all-or-nothing.
    ///
    /// Re-calling with the same session refreshes its holds (replace, never
    /// duplicate), so client retries are safe. Retries SQLITE_BUSY up to
    /// [`RESERVE_MAX_ATTEMPTS`] times; after that the caller sees
    /// [`DbError::Busy`] and may retry with backoff.
    pub async fn reserve(
        &self,
        event_id: &str,
        session_id: &str,
        lines: &[ReserveLine],
        hold_duration: Duration,
    ) -> DbResult<ReserveOutcome> {
        validation::validate_reserve_request(session_id, lines)?;

        let mut attempt = 1;
        loop {
            match self
                .try_reserve(event_id, session_id, lines, hold_duration)
                .await
            {
                Err(DbError::Busy) if attempt < RESERVE_MAX_ATTEMPTS => {
                    debug!(event_id, session_id, attempt, "Reserve hit write contention, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(25 * attempt as u64))
                        .await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// One reservation attempt: a single write-locked transaction.
    async fn try_reserve(
        &self,
        event_id: &str,
        session_id: &str,
        lines: &[ReserveLine],
        hold_duration: Duration,
    ) -> DbResult<ReserveOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // First statement is a write: escalates this transaction to the
        // database write lock before any count is read, and doubles as the
        // event existence check.
        let touched =
            sqlx::query("UPDATE events SET lock_generation = lock_generation + 1 WHERE id = ?1")
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("Event", event_id));
        }

        let ceiling: Option<i64> =
            sqlx::query_scalar("SELECT total_capacity FROM events WHERE id = ?1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;

        // Resolve every requested unit against the configuration.
        let tiers = counts::tier_capacities(&mut *tx, event_id).await?;
        let seats = counts::seat_unit_ids(&mut *tx, event_id).await?;

        let mut resolved: Vec<(String, i64, i64)> = Vec::with_capacity(lines.len());
        for line in lines {
            let unit_id = line.unit.unit_id();
            let capacity = match line.unit.kind() {
                UnitKind::Ga => *tiers
                    .get(&unit_id)
                    .ok_or_else(|| DbError::not_found("Ticket tier", unit_id.clone()))?,
                UnitKind::Reserved => {
                    if !seats.contains(&unit_id) {
                        return Err(DbError::not_found("Seat", unit_id));
                    }
                    1
                }
            };
            resolved.push((unit_id, capacity, line.quantity));
        }

        // Availability at decision time. The session's own live holds are
        // excluded everywhere: they are about to be replaced.
        let sold = counts::sold_by_unit(&mut *tx, event_id).await?;
        let blocked = counts::blocked_by_unit(&mut *tx, event_id).await?;
        let held = counts::held_by_unit(&mut *tx, event_id, now, Some(session_id)).await?;

        let count_for = |map: &HashMap<String, i64>, unit_id: &str| -> i64 {
            map.get(unit_id).copied().unwrap_or(0)
        };

        let mut conflicts: Vec<UnitConflict> = Vec::new();
        for (unit_id, capacity, requested) in &resolved {
            let available = (capacity
                - count_for(&sold, unit_id)
                - count_for(&blocked, unit_id)
                - count_for(&held, unit_id))
            .max(0);
            if *requested > available {
                conflicts.push(UnitConflict {
                    unit_id: unit_id.clone(),
                    requested: *requested,
                    available,
                });
            }
        }

        // The event ceiling caps the aggregate even when every per-unit
        // check passes.
        if let Some(ceiling) = ceiling {
            let requested_total: i64 = resolved.iter().map(|(_, _, q)| q).sum();
            let headroom = (ceiling
                - sold.values().sum::<i64>()
                - blocked.values().sum::<i64>()
                - held.values().sum::<i64>())
            .max(0);
            if requested_total > headroom {
                conflicts.push(UnitConflict {
                    unit_id: event_id.to_string(),
                    requested: requested_total,
                    available: headroom,
                });
            }
        }

        if !conflicts.is_empty() {
            tx.rollback().await?;
            info!(
                event_id,
                session_id,
                conflicts = conflicts.len(),
                "Reserve rejected"
            );
            return Ok(ReserveOutcome::Rejected { conflicts });
        }

        // Replace-on-reserve: drop the session's prior holds for this event,
        // then write the fresh set.
        sqlx::query("DELETE FROM holds WHERE event_id = ?1 AND session_id = ?2")
            .bind(event_id)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        let held_until = now + hold_duration;
        let mut holds = Vec::with_capacity(resolved.len());
        for (unit_id, _, quantity) in &resolved {
            let hold = Hold {
                id: Hold::compose_id(event_id, session_id, unit_id),
                event_id: event_id.to_string(),
                session_id: session_id.to_string(),
                unit_id: unit_id.clone(),
                quantity: *quantity,
                held_until,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO holds
                    (id, event_id, session_id, unit_id, quantity, held_until, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&hold.id)
            .bind(&hold.event_id)
            .bind(&hold.session_id)
            .bind(&hold.unit_id)
            .bind(hold.quantity)
            .bind(hold.held_until)
            .bind(hold.created_at)
            .execute(&mut *tx)
            .await?;

            holds.push(hold);
        }

        tx.commit().await?;

        info!(
            event_id,
            session_id,
            units = holds.len(),
            %held_until,
            "Holds reserved"
        );
        Ok(ReserveOutcome::Reserved { holds, held_until })
    }

    /// Releases a session's holds for an event.
    ///
    /// With `unit_ids`, only those holds are deleted; without, all of the
    /// session's holds for the event go. Idempotent: releasing holds that
    /// already expired, were swept, or never existed succeeds and reports
    /// how many rows actually went away.
    pub async fn release(
        &self,
        event_id: &str,
        session_id: &str,
        unit_ids: Option<&[String]>,
    ) -> DbResult<u64> {
        validation::validate_session_id(session_id)?;

        let removed = match unit_ids {
            None => {
                sqlx::query("DELETE FROM holds WHERE event_id = ?1 AND session_id = ?2")
                    .bind(event_id)
                    .bind(session_id)
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
            Some(ids) => {
                let mut removed = 0u64;
                for unit_id in ids {
                    removed += sqlx::query(
                        "DELETE FROM holds WHERE event_id = ?1 AND session_id = ?2 AND unit_id = ?3",
                    )
                    .bind(event_id)
                    .bind(session_id)
                    .bind(unit_id)
                    .execute(&self.pool)
                    .await?
                    .rows_affected();
                }
                removed
            }
        };

        debug!(event_id, session_id, removed, "Holds released");
        Ok(removed)
    }

    /// A session's live holds for an event, for the "my holds" view.
    pub async fn session_holds(
        &self,
        event_id: &str,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<Hold>> {
        let holds = sqlx::query_as::<_, Hold>(
            r#"
            SELECT id, event_id, session_id, unit_id, quantity, held_until, created_at
            FROM holds
            WHERE event_id = ?1 AND session_id = ?2 AND held_until > ?3
            ORDER BY unit_id
            "#,
        )
        .bind(event_id)
        .bind(session_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(holds)
    }

    /// All live holds for an event.
    pub async fn live_holds(&self, event_id: &str, now: DateTime<Utc>) -> DbResult<Vec<Hold>> {
        let holds = sqlx::query_as::<_, Hold>(
            r#"
            SELECT id, event_id, session_id, unit_id, quantity, held_until, created_at
            FROM holds
            WHERE event_id = ?1 AND held_until > ?2
            ORDER BY unit_id
            "#,
        )
        .bind(event_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(holds)
    }

    /// Deletes an event's expired holds. Pure housekeeping: liveness is
    /// always re-derived from `held_until`, so correctness never depends on
    /// this running promptly.
    pub async fn sweep_expired(&self, event_id: &str) -> DbResult<u64> {
        let removed = sqlx::query("DELETE FROM holds WHERE event_id = ?1 AND held_until <= ?2")
            .bind(event_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            debug!(event_id, removed, "Swept expired holds");
        }
        Ok(removed)
    }

    /// Deletes expired holds across all events (periodic sweep).
    pub async fn sweep_all_expired(&self) -> DbResult<u64> {
        let removed = sqlx::query("DELETE FROM holds WHERE held_until <= ?1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            debug!(removed, "Swept expired holds across all events");
        }
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use turnstile_core::{SeatRef, SellableUnit};

    fn hold_window() -> Duration {
        Duration::minutes(5)
    }

    fn ga(qty: i64) -> ReserveLine {
        ReserveLine::new(SellableUnit::tier("tier-ga"), qty)
    }

    fn seat(section: &str, row: &str, number: &str) -> ReserveLine {
        ReserveLine::new(SellableUnit::seat(SeatRef::new(section, row, number)), 1)
    }

    async fn ga_event(db: &Database, capacity: i64, ceiling: Option<i64>) -> String {
        let event = db.capacity().create_event("Show", ceiling).await.unwrap();
        db.capacity()
            .create_tier(&event.id, "tier-ga", "GA", capacity)
            .await
            .unwrap();
        event.id
    }

    /// Forces a session's holds into the past, simulating clock advance.
    async fn expire_session_holds(db: &Database, event_id: &str, session_id: &str) {
        let past = Utc::now() - Duration::hours(1);
        sqlx::query("UPDATE holds SET held_until = ?1 WHERE event_id = ?2 AND session_id = ?3")
            .bind(past)
            .bind(event_id)
            .bind(session_id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn second_session_gets_accurate_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event_id = ga_event(&db, 10, None).await;
        let holds = db.holds();

        // capacity 10: A takes 7, B wants 5 → conflict with available 3
        let a = holds.reserve(&event_id, "sess-a", &[ga(7)], hold_window()).await.unwrap();
        assert!(a.is_reserved());

        let b = holds.reserve(&event_id, "sess-b", &[ga(5)], hold_window()).await.unwrap();
        match b {
            ReserveOutcome::Rejected { conflicts } => {
                assert_eq!(
                    conflicts,
                    vec![UnitConflict {
                        unit_id: "tier-ga".into(),
                        requested: 5,
                        available: 3,
                    }]
                );
            }
            ReserveOutcome::Reserved { .. } => panic!("expected rejection"),
        }

        // A releases → full capacity again
        holds.release(&event_id, "sess-a", None).await.unwrap();
        let b = holds.reserve(&event_id, "sess-b", &[ga(5)], hold_window()).await.unwrap();
        assert!(b.is_reserved());
    }

    #[tokio::test]
    async fn re_reserve_replaces_instead_of_duplicating() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event_id = ga_event(&db, 10, None).await;
        let holds = db.holds();

        holds.reserve(&event_id, "sess-a", &[ga(7)], hold_window()).await.unwrap();
        // Same session again: refresh, not accumulate. 7 + 6 would not fit.
        let again = holds.reserve(&event_id, "sess-a", &[ga(6)], hold_window()).await.unwrap();
        assert!(again.is_reserved());

        let live = holds.live_holds(&event_id, Utc::now()).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].quantity, 6);
        assert_eq!(live[0].id, Hold::compose_id(&event_id, "sess-a", "tier-ga"));
    }

    #[tokio::test]
    async fn expired_holds_do_not_count_even_before_sweep() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event_id = ga_event(&db, 10, None).await;
        let holds = db.holds();

        holds.reserve(&event_id, "sess-a", &[ga(10)], hold_window()).await.unwrap();
        expire_session_holds(&db, &event_id, "sess-a").await;

        // Not yet swept, but the expired hold is invisible to contention.
        let b = holds.reserve(&event_id, "sess-b", &[ga(10)], hold_window()).await.unwrap();
        assert!(b.is_reserved());

        // Sweep removes only the expired row.
        let removed = holds.sweep_expired(&event_id).await.unwrap();
        assert_eq!(removed, 1);
        let live = holds.live_holds(&event_id, Utc::now()).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].session_id, "sess-b");
    }

    #[tokio::test]
    async fn seat_contention_and_expiry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event = db.capacity().create_event("Seated", None).await.unwrap();
        db.capacity()
            .create_seats(&event.id, &[SeatRef::new("A", "1", "5")])
            .await
            .unwrap();
        let holds = db.holds();

        let x = holds
            .reserve(&event.id, "sess-x", &[seat("A", "1", "5")], hold_window())
            .await
            .unwrap();
        assert!(x.is_reserved());

        let y = holds
            .reserve(&event.id, "sess-y", &[seat("A", "1", "5")], hold_window())
            .await
            .unwrap();
        match y {
            ReserveOutcome::Rejected { conflicts } => {
                assert_eq!(conflicts[0].unit_id, "A-1-5");
                assert_eq!(conflicts[0].available, 0);
            }
            ReserveOutcome::Reserved { .. } => panic!("expected rejection"),
        }

        // X's hold expires → Y gets the seat.
        expire_session_holds(&db, &event.id, "sess-x").await;
        let y = holds
            .reserve(&event.id, "sess-y", &[seat("A", "1", "5")], hold_window())
            .await
            .unwrap();
        assert!(y.is_reserved());
    }

    #[tokio::test]
    async fn sold_and_blocked_reduce_availability() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event_id = ga_event(&db, 10, None).await;

        db.orders()
            .record_order(&event_id, turnstile_core::OrderStatus::Completed, &[ga(4)])
            .await
            .unwrap();
        db.blocks()
            .block(
                &event_id,
                &[crate::BlockSpec::new(SellableUnit::tier("tier-ga"), 3)],
                Some("VIP hold"),
                "ops",
            )
            .await
            .unwrap();

        // 10 - 4 sold - 3 blocked = 3 available
        let out = db
            .holds()
            .reserve(&event_id, "sess-a", &[ga(4)], hold_window())
            .await
            .unwrap();
        match out {
            ReserveOutcome::Rejected { conflicts } => {
                assert_eq!(conflicts[0].available, 3);
            }
            ReserveOutcome::Reserved { .. } => panic!("expected rejection"),
        }

        assert!(db
            .holds()
            .reserve(&event_id, "sess-a", &[ga(3)], hold_window())
            .await
            .unwrap()
            .is_reserved());
    }

    #[tokio::test]
    async fn event_ceiling_caps_across_tiers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event = db.capacity().create_event("Capped", Some(15)).await.unwrap();
        db.capacity()
            .create_tier(&event.id, "tier-a", "A", 10)
            .await
            .unwrap();
        db.capacity()
            .create_tier(&event.id, "tier-b", "B", 10)
            .await
            .unwrap();
        let holds = db.holds();

        let lines = vec![
            ReserveLine::new(SellableUnit::tier("tier-a"), 9),
            ReserveLine::new(SellableUnit::tier("tier-b"), 9),
        ];
        let out = holds.reserve(&event.id, "sess-a", &lines, hold_window()).await.unwrap();
        match out {
            ReserveOutcome::Rejected { conflicts } => {
                // Per-tier both fit; only the aggregate conflicts.
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].unit_id, event.id);
                assert_eq!(conflicts[0].requested, 18);
                assert_eq!(conflicts[0].available, 15);
            }
            ReserveOutcome::Reserved { .. } => panic!("expected rejection"),
        }

        let lines = vec![
            ReserveLine::new(SellableUnit::tier("tier-a"), 8),
            ReserveLine::new(SellableUnit::tier("tier-b"), 7),
        ];
        assert!(holds
            .reserve(&event.id, "sess-a", &lines, hold_window())
            .await
            .unwrap()
            .is_reserved());
    }

    #[tokio::test]
    async fn invalid_and_unknown_requests() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event_id = ga_event(&db, 10, None).await;
        let holds = db.holds();

        let err = holds.reserve(&event_id, "sess-a", &[], hold_window()).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        let err = holds
            .reserve(&event_id, "sess-a", &[ga(0)], hold_window())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        let err = holds
            .reserve("evt-missing", "sess-a", &[ga(1)], hold_window())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let unknown = ReserveLine::new(SellableUnit::tier("tier-nope"), 1);
        let err = holds
            .reserve(&event_id, "sess-a", &[unknown], hold_window())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn release_is_idempotent_and_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let event_id = ga_event(&db, 10, None).await;
        let holds = db.holds();

        holds.reserve(&event_id, "sess-a", &[ga(2)], hold_window()).await.unwrap();

        let ids = vec!["tier-ga".to_string()];
        assert_eq!(holds.release(&event_id, "sess-a", Some(&ids)).await.unwrap(), 1);
        // Releasing again (already gone) succeeds with zero rows.
        assert_eq!(holds.release(&event_id, "sess-a", Some(&ids)).await.unwrap(), 0);
        assert_eq!(holds.release(&event_id, "sess-a", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_reserves_admit_exactly_one_winner() {
        // File-backed database so the two tasks genuinely contend for the
        // write lock instead of serializing on a single pooled connection.
        let path = std::env::temp_dir().join(format!(
            "turnstile-reserve-race-{}.db",
            uuid::Uuid::new_v4()
        ));
        let db = Database::new(DbConfig::new(&path).max_connections(5))
            .await
            .unwrap();
        let event_id = ga_event(&db, 10, None).await;

        let h1 = db.holds();
        let h2 = db.holds();
        let (e1, e2) = (event_id.clone(), event_id.clone());

        let t1 = tokio::spawn(async move { h1.reserve(&e1, "sess-1", &[ga(7)], hold_window()).await });
        let t2 = tokio::spawn(async move { h2.reserve(&e2, "sess-2", &[ga(5)], hold_window()).await });

        let r1 = t1.await.unwrap().unwrap();
        let r2 = t2.await.unwrap().unwrap();

        // 7 + 5 > 10: exactly one of them can win.
        assert!(r1.is_reserved() ^ r2.is_reserved());

        // Invariant: live holds never exceed capacity.
        let live = db.holds().live_holds(&event_id, Utc::now()).await.unwrap();
        let total_held: i64 = live.iter().map(|h| h.quantity).sum();
        assert!(total_held <= 10);

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn write_lock_contention_surfaces_busy_after_retries() {
        let path = std::env::temp_dir().join(format!(
            "turnstile-reserve-busy-{}.db",
            uuid::Uuid::new_v4()
        ));
        // Short busy timeout so retry exhaustion happens quickly.
        let db = Database::new(
            DbConfig::new(&path)
                .max_connections(2)
                .busy_timeout(std::time::Duration::from_millis(50)),
        )
        .await
        .unwrap();
        let event_id = ga_event(&db, 10, None).await;

        // Park a transaction on the database write lock and keep it open
        // past every retry.
        let mut blocker = db.pool().begin().await.unwrap();
        sqlx::query("UPDATE events SET lock_generation = lock_generation + 1 WHERE id = ?1")
            .bind(&event_id)
            .execute(&mut *blocker)
            .await
            .unwrap();

        let err = db
            .holds()
            .reserve(&event_id, "sess-a", &[ga(1)], hold_window())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Busy));
        assert!(err.is_transient());

        // Lock released → the same request succeeds on a plain retry.
        blocker.rollback().await.unwrap();
        assert!(db
            .holds()
            .reserve(&event_id, "sess-a", &[ga(1)], hold_window())
            .await
            .unwrap()
            .is_reserved());

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
