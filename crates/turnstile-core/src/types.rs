//! # Domain Types
//!
//! Core domain types for the reservation system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SellableUnit   │   │      Hold       │   │   AdminBlock    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Tier(tier_id)  │   │  id (composite) │   │  id (UUID)      │       │
//! │  │  Seat(section,  │   │  session_id     │   │  unit_id        │       │
//! │  │       row, num) │   │  unit_id        │   │  quantity       │       │
//! │  │                 │   │  held_until     │   │  created_by     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CapacityRecord  │   │   OrderStatus   │   │  UnitConflict   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  unit_id        │   │  Completed ✓    │   │  unit_id        │       │
//! │  │  capacity       │   │  Confirmed ✓    │   │  requested      │       │
//! │  │  (read-only)    │   │  Pending        │   │  available      │       │
//! │  └─────────────────┘   │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Identity Constructor
//! Orders address units by tier id (GA) or seat coordinates (reserved); the
//! reservation core addresses everything by a single `unit_id` string. The
//! ONLY place a seat id is assembled from its parts is
//! [`SeatRef::seat_id`] - assembling it ad hoc anywhere else is how two
//! halves of a system end up disagreeing about which seat is taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Unit Identity
// =============================================================================

/// Delimiter joining seat id components. Seat components are validated to
/// never contain it (see [`crate::validation`]).
pub const SEAT_ID_DELIMITER: char = '-';

/// Whether a sellable unit is a GA tier or a reserved seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// General admission: a tier with a configured capacity.
    Ga,
    /// Reserved seating: a specific seat, capacity 1.
    Reserved,
}

/// A reserved seat addressed by its coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRef {
    /// Seating section, e.g. `"A"` or `"balcony"`.
    pub section_id: String,
    /// Row within the section.
    pub row: String,
    /// Seat number within the row.
    pub number: String,
}

impl SeatRef {
    pub fn new(
        section_id: impl Into<String>,
        row: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        SeatRef {
            section_id: section_id.into(),
            row: row.into(),
            number: number.into(),
        }
    }

    /// The canonical seat id: `"{section}-{row}-{number}"`.
    ///
    /// Seat `"A"` / row `"1"` / number `"5"` becomes `"A-1-5"`. Every sold
    /// count, block, hold and conflict for this seat uses exactly this
    /// string.
    pub fn seat_id(&self) -> String {
        format!(
            "{}{d}{}{d}{}",
            self.section_id,
            self.row,
            self.number,
            d = SEAT_ID_DELIMITER
        )
    }
}

/// The atomic thing a hold reserves: a GA tier or an individual seat.
///
/// Identity is immutable; capacity is a property of the owning event's
/// configuration, not of the unit itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SellableUnit {
    /// A general-admission tier, identified by its tier id.
    Ga { tier_id: String },
    /// A reserved seat, identified by its coordinates.
    Reserved { seat: SeatRef },
}

impl SellableUnit {
    pub fn tier(tier_id: impl Into<String>) -> Self {
        SellableUnit::Ga {
            tier_id: tier_id.into(),
        }
    }

    pub fn seat(seat: SeatRef) -> Self {
        SellableUnit::Reserved { seat }
    }

    /// The canonical unit id shared by both addressing schemes.
    ///
    /// GA tiers use the tier id as-is; seats use [`SeatRef::seat_id`].
    pub fn unit_id(&self) -> String {
        match self {
            SellableUnit::Ga { tier_id } => tier_id.clone(),
            SellableUnit::Reserved { seat } => seat.seat_id(),
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            SellableUnit::Ga { .. } => UnitKind::Ga,
            SellableUnit::Reserved { .. } => UnitKind::Reserved,
        }
    }
}

// =============================================================================
// Capacity Configuration
// =============================================================================

/// An event as the reservation core sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    /// Optional event-level ceiling on total tickets. When set it is
    /// authoritative even if lower than the sum of per-unit capacities;
    /// when `None` the aggregate is the per-unit sum.
    pub total_capacity: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Configured capacity for one sellable unit. Read-only to this core: set at
/// event configuration time, changed only by operator tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityRecord {
    pub event_id: String,
    pub unit_id: String,
    pub kind: UnitKind,
    /// Tier capacity for GA; always 1 for a seat.
    pub capacity: i64,
}

// =============================================================================
// Orders (external collaborator, read-only)
// =============================================================================

/// Status of an order in the external Order subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Payment not yet captured; units are not sold.
    Pending,
    /// Payment captured; units are irrevocably sold.
    Completed,
    /// Alternate finalized status used by some payment providers.
    Confirmed,
    /// Abandoned or refunded before finalization.
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this status counts toward sold counts.
    pub fn is_finalized(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// The order statuses that make units irrevocably sold.
pub const FINALIZED_ORDER_STATUSES: [OrderStatus; 2] =
    [OrderStatus::Completed, OrderStatus::Confirmed];

// =============================================================================
// Holds
// =============================================================================

/// A time-limited, session-scoped reservation of one sellable unit.
///
/// ## Lifecycle
/// ```text
/// Reserve ──► Hold { held_until: now + duration }
///    │             │
///    │ re-reserve  │ expiry / Release / sweep
///    ▼             ▼
/// replaced       deleted
/// ```
///
/// Finalization never touches holds: once the external Order subsystem has
/// recorded the sale, the hold simply expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Hold {
    /// Deterministic composite id, see [`Hold::compose_id`].
    pub id: String,
    pub event_id: String,
    pub session_id: String,
    pub unit_id: String,
    pub quantity: i64,
    /// Absolute expiry. The hold is live iff `held_until > now`.
    pub held_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Hold {
    /// Deterministic hold id: `"{event}:{session}:{unit}"`.
    ///
    /// One session can have at most one hold per unit, so re-reserving the
    /// same unit replaces the row instead of accumulating duplicates.
    pub fn compose_id(event_id: &str, session_id: &str, unit_id: &str) -> String {
        format!("{event_id}:{session_id}:{unit_id}")
    }

    /// Whether this hold still counts against availability at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.held_until > now
    }
}

// =============================================================================
// Admin Blocks
// =============================================================================

/// An operator-created reservation that removes capacity outside the
/// checkout flow (e.g. "VIP hold", "production kills"). Reduces availability
/// identically to a sale and lives until explicitly removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AdminBlock {
    pub id: String,
    pub event_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "unit_kind"))]
    pub kind: UnitKind,
    pub unit_id: String,
    /// Blocked quantity for GA; always 1 for a seat.
    pub quantity: i64,
    pub reason: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Audit Log
// =============================================================================

/// Kinds of operator action recorded in the append-only inventory log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    Block,
    Unblock,
    CapacityChange,
}

// =============================================================================
// Reservation Requests & Conflicts
// =============================================================================

/// One line of a reservation request: a unit and how many of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveLine {
    pub unit: SellableUnit,
    pub quantity: i64,
}

impl ReserveLine {
    pub fn new(unit: SellableUnit, quantity: i64) -> Self {
        ReserveLine { unit, quantity }
    }
}

/// Why one requested unit could not be held, with availability as computed
/// at decision time inside the reserve transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConflict {
    pub unit_id: String,
    pub requested: i64,
    pub available: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn seat_id_is_canonical() {
        let seat = SeatRef::new("A", "1", "5");
        assert_eq!(seat.seat_id(), "A-1-5");
        assert_eq!(SellableUnit::seat(seat).unit_id(), "A-1-5");
    }

    #[test]
    fn tier_unit_id_is_the_tier_id() {
        let unit = SellableUnit::tier("tier-ga");
        assert_eq!(unit.unit_id(), "tier-ga");
        assert_eq!(unit.kind(), UnitKind::Ga);
    }

    #[test]
    fn hold_id_is_deterministic() {
        let a = Hold::compose_id("evt", "sess", "A-1-5");
        let b = Hold::compose_id("evt", "sess", "A-1-5");
        assert_eq!(a, b);
        assert_eq!(a, "evt:sess:A-1-5");
    }

    #[test]
    fn hold_liveness_is_strict() {
        let now = Utc::now();
        let hold = Hold {
            id: "e:s:u".into(),
            event_id: "e".into(),
            session_id: "s".into(),
            unit_id: "u".into(),
            quantity: 1,
            held_until: now,
            created_at: now - Duration::minutes(5),
        };
        // held_until == now is already expired
        assert!(!hold.is_live(now));
        assert!(hold.is_live(now - Duration::seconds(1)));
    }

    #[test]
    fn finalized_statuses() {
        assert!(OrderStatus::Completed.is_finalized());
        assert!(OrderStatus::Confirmed.is_finalized());
        assert!(!OrderStatus::Pending.is_finalized());
        assert!(!OrderStatus::Cancelled.is_finalized());
    }
}
