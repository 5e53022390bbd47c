//! # Order Repository
//!
//! The external order store, as seen from the reservation core.
//!
//! ## Two Addressing Schemes, One Unit-Id Space
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      The Sold Ledger Read                               │
//! │                                                                         │
//! │  orders (status IN completed, confirmed)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  order_items                                                            │
//! │  ├── GA line:   ticket_tier_id = "tier-ga", quantity = 2                │
//! │  └── Seat line: section "A", row "1", number "5", quantity = 1          │
//! │       │                                                                 │
//! │       ▼  reconcile (SeatRef::seat_id)                                   │
//! │  { "tier-ga": 2, "A-1-5": 1 }                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This core never mutates an order after creation; `record_order` exists so
//! tests and the seed binary can stand in for the Order subsystem.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::counts;
use turnstile_core::{OrderStatus, ReserveLine, SellableUnit};

/// Repository for order reads (sold ledger) and test/seed writes.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Sold counts per unit id from finalized orders.
    ///
    /// This is the Sold Ledger read: a snapshot, indexed on
    /// `(event_id, status)`. Units sold under either addressing scheme come
    /// back in the canonical unit-id space.
    pub async fn sold_by_unit(&self, event_id: &str) -> DbResult<HashMap<String, i64>> {
        let mut conn = self.pool.acquire().await?;
        counts::sold_by_unit(&mut conn, event_id).await
    }

    /// Records an order with line items, standing in for the external Order
    /// subsystem (seed binary and tests only).
    pub async fn record_order(
        &self,
        event_id: &str,
        status: OrderStatus,
        lines: &[ReserveLine],
    ) -> DbResult<String> {
        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(order_id = %order_id, event_id, status = status.as_str(), "Recording order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, event_id, status, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&order_id)
        .bind(event_id)
        .bind(status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            match &line.unit {
                SellableUnit::Ga { tier_id } => {
                    sqlx::query(
                        r#"
                        INSERT INTO order_items (id, order_id, ticket_tier_id, quantity)
                        VALUES (?1, ?2, ?3, ?4)
                        "#,
                    )
                    .bind(Uuid::new_v4().to_string())
                    .bind(&order_id)
                    .bind(tier_id)
                    .bind(line.quantity)
                    .execute(&mut *tx)
                    .await?;
                }
                SellableUnit::Reserved { seat } => {
                    sqlx::query(
                        r#"
                        INSERT INTO order_items
                            (id, order_id, section_id, row_label, seat_number, quantity)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                        "#,
                    )
                    .bind(Uuid::new_v4().to_string())
                    .bind(&order_id)
                    .bind(&seat.section_id)
                    .bind(&seat.row)
                    .bind(&seat.number)
                    .bind(line.quantity)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(order_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
