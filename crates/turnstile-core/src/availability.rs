//! # Availability Arithmetic
//!
//! Pure math behind every availability decision in the system.
//!
//! ## The One Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per-Unit Availability                                │
//! │                                                                         │
//! │   available = max(0, capacity - sold - blocked - held)                  │
//! │                                                                         │
//! │   capacity  ─ configured at event setup (read-only here)                │
//! │   sold      ─ finalized orders (completed/confirmed)                    │
//! │   blocked   ─ operator admin blocks                                     │
//! │   held      ─ LIVE checkout holds (held_until > now)                    │
//! │                                                                         │
//! │   Event aggregate: same formula over the totals, additionally capped    │
//! │   by the event ceiling when one is configured.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The Availability Calculator uses this for display snapshots; the Hold
//! Manager re-runs the exact same arithmetic inside its transaction. Both
//! call into this module so they can never disagree about the formula.

use serde::{Deserialize, Serialize};

use crate::types::UnitKind;

// =============================================================================
// Per-Unit Availability
// =============================================================================

/// Availability breakdown for one sellable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAvailability {
    pub unit_id: String,
    pub kind: UnitKind,
    pub capacity: i64,
    pub sold: i64,
    pub blocked: i64,
    pub held: i64,
    pub available: i64,
}

impl UnitAvailability {
    /// Computes availability for one unit, clamping at zero.
    ///
    /// Negative availability can only arise from configuration edits after
    /// sales (capacity lowered below sold); clamping keeps the display sane
    /// while the invariant check in the Hold Manager still rejects further
    /// reservations.
    pub fn compute(
        unit_id: impl Into<String>,
        kind: UnitKind,
        capacity: i64,
        sold: i64,
        blocked: i64,
        held: i64,
    ) -> Self {
        UnitAvailability {
            unit_id: unit_id.into(),
            kind,
            capacity,
            sold,
            blocked,
            held,
            available: (capacity - sold - blocked - held).max(0),
        }
    }
}

// =============================================================================
// Event Aggregate
// =============================================================================

/// Event-level availability: per-unit breakdowns plus capped totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAvailability {
    pub event_id: String,
    /// Event ceiling when configured, otherwise the sum of unit capacities.
    pub total_capacity: i64,
    pub total_sold: i64,
    pub total_blocked: i64,
    pub total_held: i64,
    pub total_available: i64,
    pub units: Vec<UnitAvailability>,
}

impl EventAvailability {
    /// Aggregates per-unit availability into the event view.
    ///
    /// The ceiling, when present, is authoritative even if lower than the
    /// sum of per-unit capacities: the total available is capped so that
    /// `sold + blocked + held + total_available` never exceeds it.
    pub fn aggregate(
        event_id: impl Into<String>,
        ceiling: Option<i64>,
        units: Vec<UnitAvailability>,
    ) -> Self {
        let sum_capacity: i64 = units.iter().map(|u| u.capacity).sum();
        let total_sold: i64 = units.iter().map(|u| u.sold).sum();
        let total_blocked: i64 = units.iter().map(|u| u.blocked).sum();
        let total_held: i64 = units.iter().map(|u| u.held).sum();

        let total_capacity = ceiling.unwrap_or(sum_capacity);
        let per_unit_available: i64 = units.iter().map(|u| u.available).sum();
        let ceiling_available = (total_capacity - total_sold - total_blocked - total_held).max(0);

        EventAvailability {
            event_id: event_id.into(),
            total_capacity,
            total_sold,
            total_blocked,
            total_held,
            total_available: per_unit_available.min(ceiling_available),
            units,
        }
    }

    /// Remaining aggregate headroom for new reservations, used by the Hold
    /// Manager's event-ceiling check.
    pub fn headroom(&self) -> i64 {
        (self.total_capacity - self.total_sold - self.total_blocked - self.total_held).max(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ga(unit_id: &str, capacity: i64, sold: i64, blocked: i64, held: i64) -> UnitAvailability {
        UnitAvailability::compute(unit_id, UnitKind::Ga, capacity, sold, blocked, held)
    }

    #[test]
    fn available_is_capacity_minus_everything() {
        let u = ga("tier", 10, 3, 2, 1);
        assert_eq!(u.available, 4);
    }

    #[test]
    fn available_clamps_at_zero() {
        // Capacity lowered below sold after the fact
        let u = ga("tier", 5, 7, 0, 0);
        assert_eq!(u.available, 0);
    }

    #[test]
    fn hold_of_seven_leaves_three_of_ten() {
        // capacity 10, sold 0, blocked 0, session holds 7 → 3 left
        let u = ga("tier", 10, 0, 0, 7);
        assert_eq!(u.available, 3);

        // after release, back to 10
        let u = ga("tier", 10, 0, 0, 0);
        assert_eq!(u.available, 10);
    }

    #[test]
    fn aggregate_without_ceiling_sums_units() {
        let ev = EventAvailability::aggregate(
            "evt",
            None,
            vec![ga("a", 10, 2, 0, 1), ga("b", 20, 5, 3, 0)],
        );
        assert_eq!(ev.total_capacity, 30);
        assert_eq!(ev.total_sold, 7);
        assert_eq!(ev.total_blocked, 3);
        assert_eq!(ev.total_held, 1);
        assert_eq!(ev.total_available, 19);
    }

    #[test]
    fn ceiling_caps_the_aggregate_when_lower() {
        // Two tiers of 10, but the venue only admits 15 total.
        let ev = EventAvailability::aggregate(
            "evt",
            Some(15),
            vec![ga("a", 10, 4, 0, 0), ga("b", 10, 4, 0, 0)],
        );
        assert_eq!(ev.total_capacity, 15);
        // Per-unit there are 12 left, but only 7 fit under the ceiling.
        assert_eq!(ev.total_available, 7);
        assert_eq!(ev.headroom(), 7);
    }

    #[test]
    fn ceiling_higher_than_sum_does_not_inflate() {
        let ev = EventAvailability::aggregate("evt", Some(100), vec![ga("a", 10, 0, 0, 0)]);
        assert_eq!(ev.total_capacity, 100);
        // Only 10 sellable units exist regardless of the ceiling.
        assert_eq!(ev.total_available, 10);
    }
}
