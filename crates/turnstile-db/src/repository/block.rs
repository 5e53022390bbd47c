//! # Admin Block Repository
//!
//! Operator-created holds that permanently remove capacity, independent of
//! checkout activity. Blocks change slowly and are operator-driven, so they
//! use plain read-after-write consistency, not the Reserve write lock - but
//! every block/unblock is committed together with its audit log entry, and
//! is visible to the very next availability read or Reserve call.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::counts;
use turnstile_core::{AdminBlock, InventoryAction, SellableUnit, UnitKind};

/// What an operator wants blocked: a unit and a quantity. Seat blocks are
/// always quantity 1; the requested quantity only applies to GA tiers.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    pub unit: SellableUnit,
    pub quantity: i64,
}

impl BlockSpec {
    pub fn new(unit: SellableUnit, quantity: i64) -> Self {
        BlockSpec { unit, quantity }
    }

    fn effective_quantity(&self) -> i64 {
        match self.unit.kind() {
            UnitKind::Ga => self.quantity,
            UnitKind::Reserved => 1,
        }
    }
}

/// Repository for admin block operations.
#[derive(Debug, Clone)]
pub struct BlockRepository {
    pool: SqlitePool,
}

impl BlockRepository {
    /// Creates a new BlockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BlockRepository { pool }
    }

    /// Blocks capacity for the given units.
    ///
    /// Validates the event and every unit, then inserts the block rows and
    /// their inventory-log entries in one transaction: either the whole
    /// block action lands with its audit trail, or none of it does.
    pub async fn block(
        &self,
        event_id: &str,
        specs: &[BlockSpec],
        reason: Option<&str>,
        actor: &str,
    ) -> DbResult<Vec<AdminBlock>> {
        if specs.is_empty() {
            return Err(DbError::Invalid(
                turnstile_core::ValidationError::Required {
                    field: "units".to_string(),
                },
            ));
        }
        for spec in specs {
            if spec.effective_quantity() <= 0 {
                return Err(DbError::Invalid(
                    turnstile_core::ValidationError::NonPositiveQuantity {
                        unit_id: spec.unit.unit_id(),
                        quantity: spec.quantity,
                    },
                ));
            }
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if counts::event_row(&mut *tx, event_id).await?.is_none() {
            return Err(DbError::not_found("Event", event_id));
        }

        let tiers = counts::tier_capacities(&mut *tx, event_id).await?;
        let seats = counts::seat_unit_ids(&mut *tx, event_id).await?;
        let blocked_before = counts::blocked_by_unit(&mut *tx, event_id).await?;

        let mut created = Vec::with_capacity(specs.len());
        for spec in specs {
            let unit_id = spec.unit.unit_id();
            let known = match spec.unit.kind() {
                UnitKind::Ga => tiers.contains_key(&unit_id),
                UnitKind::Reserved => seats.contains(&unit_id),
            };
            if !known {
                return Err(DbError::not_found("Unit", unit_id));
            }

            let block = AdminBlock {
                id: Uuid::new_v4().to_string(),
                event_id: event_id.to_string(),
                kind: spec.unit.kind(),
                unit_id: unit_id.clone(),
                quantity: spec.effective_quantity(),
                reason: reason.map(str::to_string),
                created_by: actor.to_string(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO admin_blocks
                    (id, event_id, unit_kind, unit_id, quantity, reason, created_by, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&block.id)
            .bind(&block.event_id)
            .bind(block.kind)
            .bind(&block.unit_id)
            .bind(block.quantity)
            .bind(&block.reason)
            .bind(&block.created_by)
            .bind(block.created_at)
            .execute(&mut *tx)
            .await?;

            let before = blocked_before.get(&unit_id).copied().unwrap_or(0);
            log_action(
                &mut tx,
                event_id,
                InventoryAction::Block,
                Some(&unit_id),
                before,
                before + block.quantity,
                actor,
                reason,
            )
            .await?;

            created.push(block);
        }

        tx.commit().await?;

        info!(event_id, count = created.len(), actor, "Admin blocks created");
        Ok(created)
    }

    /// Removes blocks by id.
    ///
    /// Idempotent: already-removed ids are skipped. Returns the number of
    /// blocks actually removed; each removal gets its own log entry.
    pub async fn unblock(
        &self,
        event_id: &str,
        block_ids: &[String],
        actor: &str,
    ) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0u64;

        for block_id in block_ids {
            let row = sqlx::query_as::<_, AdminBlock>(
                r#"
                SELECT id, event_id, unit_kind, unit_id, quantity, reason, created_by, created_at
                FROM admin_blocks
                WHERE id = ?1 AND event_id = ?2
                "#,
            )
            .bind(block_id)
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(block) = row else {
                debug!(block_id, "Unblock skipped: block already removed");
                continue;
            };

            sqlx::query("DELETE FROM admin_blocks WHERE id = ?1")
                .bind(block_id)
                .execute(&mut *tx)
                .await?;

            let blocked_now = counts::blocked_by_unit(&mut *tx, event_id).await?;
            let after = blocked_now.get(&block.unit_id).copied().unwrap_or(0);
            log_action(
                &mut tx,
                event_id,
                InventoryAction::Unblock,
                Some(&block.unit_id),
                after + block.quantity,
                after,
                actor,
                None,
            )
            .await?;

            removed += 1;
        }

        tx.commit().await?;

        info!(event_id, removed, actor, "Admin blocks removed");
        Ok(removed)
    }

    /// Lists an event's blocks, newest first.
    pub async fn list(&self, event_id: &str) -> DbResult<Vec<AdminBlock>> {
        let blocks = sqlx::query_as::<_, AdminBlock>(
            r#"
            SELECT id, event_id, unit_kind, unit_id, quantity, reason, created_by, created_at
            FROM admin_blocks
            WHERE event_id = ?1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(blocks)
    }
}

/// Appends one inventory-log row inside the caller's transaction.
#[allow(clippy::too_many_arguments)]
async fn log_action(
    tx: &mut Transaction<'_, Sqlite>,
    event_id: &str,
    action: InventoryAction,
    unit_id: Option<&str>,
    before: i64,
    after: i64,
    actor: &str,
    reason: Option<&str>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_log
            (id, event_id, action, unit_id, before_value, after_value, actor, reason, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(event_id)
    .bind(action)
    .bind(unit_id)
    .bind(before)
    .bind(after)
    .bind(actor)
    .bind(reason)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
