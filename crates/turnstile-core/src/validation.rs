//! # Validation Module
//!
//! Reservation request validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP deserialization (serde)                                  │
//! │  └── Shape and type checks                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (pure rules)                                      │
//! │  ├── Session id present                                                 │
//! │  ├── Non-empty request, positive bounded quantities                     │
//! │  └── Seat components free of the id delimiter                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (quantity > 0) constraints                                   │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: each layer catches different mistakes                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{ReserveLine, SeatRef, SellableUnit, SEAT_ID_DELIMITER};
use crate::{MAX_LINE_QUANTITY, MAX_REQUEST_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Session Validation
// =============================================================================

/// Validates a checkout session id.
///
/// ## Rules
/// - Must not be empty or whitespace-only
pub fn validate_session_id(session_id: &str) -> ValidationResult<()> {
    if session_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "sessionId".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Seat Validation
// =============================================================================

/// Validates one seat reference.
///
/// ## Rules
/// - Every component present
/// - No component may contain the seat-id delimiter: `"A-1"` as a section
///   would make seat `("A-1", "2", "3")` collide with `("A", "1-2", "3")`.
pub fn validate_seat_ref(seat: &SeatRef) -> ValidationResult<()> {
    let components = [
        ("sectionId", &seat.section_id),
        ("row", &seat.row),
        ("number", &seat.number),
    ];

    for (field, value) in components {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
        if value.contains(SEAT_ID_DELIMITER) {
            return Err(ValidationError::InvalidSeatComponent {
                field: field.to_string(),
                value: value.clone(),
                delimiter: SEAT_ID_DELIMITER,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Reservation Request Validation
// =============================================================================

/// Validates a full reservation request before it reaches the Hold Manager.
///
/// ## Rules
/// - Session id present
/// - At least one line, at most [`MAX_REQUEST_LINES`]
/// - Each quantity in `1..=MAX_LINE_QUANTITY`
/// - No unit requested twice (its hold id would silently collapse them)
/// - Seat references well-formed
pub fn validate_reserve_request(session_id: &str, lines: &[ReserveLine]) -> ValidationResult<()> {
    validate_session_id(session_id)?;

    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "tickets".to_string(),
        });
    }
    if lines.len() > MAX_REQUEST_LINES {
        return Err(ValidationError::TooManyLines {
            max: MAX_REQUEST_LINES,
        });
    }

    let mut seen: HashSet<String> = HashSet::with_capacity(lines.len());
    for line in lines {
        let unit_id = line.unit.unit_id();

        if line.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity {
                unit_id,
                quantity: line.quantity,
            });
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        if let SellableUnit::Reserved { seat } = &line.unit {
            validate_seat_ref(seat)?;
        }

        if !seen.insert(unit_id.clone()) {
            return Err(ValidationError::DuplicateUnit { unit_id });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ga_line(tier: &str, qty: i64) -> ReserveLine {
        ReserveLine::new(SellableUnit::tier(tier), qty)
    }

    #[test]
    fn accepts_a_normal_request() {
        let lines = vec![ga_line("tier-ga", 2), ga_line("tier-vip", 1)];
        assert!(validate_reserve_request("sess-1", &lines).is_ok());
    }

    #[test]
    fn rejects_missing_session() {
        let lines = vec![ga_line("tier-ga", 2)];
        assert!(matches!(
            validate_reserve_request("  ", &lines),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn rejects_empty_request() {
        assert!(matches!(
            validate_reserve_request("sess-1", &[]),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn rejects_zero_quantity() {
        let lines = vec![ga_line("tier-ga", 0)];
        assert!(matches!(
            validate_reserve_request("sess-1", &lines),
            Err(ValidationError::NonPositiveQuantity { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_unit() {
        let lines = vec![ga_line("tier-ga", 1), ga_line("tier-ga", 2)];
        assert!(matches!(
            validate_reserve_request("sess-1", &lines),
            Err(ValidationError::DuplicateUnit { .. })
        ));
    }

    #[test]
    fn rejects_delimiter_in_seat_component() {
        let seat = SeatRef::new("A-1", "2", "3");
        assert!(matches!(
            validate_seat_ref(&seat),
            Err(ValidationError::InvalidSeatComponent { .. })
        ));
    }

    #[test]
    fn rejects_oversized_quantity() {
        let lines = vec![ga_line("tier-ga", MAX_LINE_QUANTITY + 1)];
        assert!(matches!(
            validate_reserve_request("sess-1", &lines),
            Err(ValidationError::QuantityTooLarge { .. })
        ));
    }
}
