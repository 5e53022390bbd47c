//! # Error Types
//!
//! Domain-specific error types for turnstile-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  turnstile-core (this file)                                              │
//! │  └── ValidationError  - Reservation request validation failures        │
//! │                                                                         │
//! │  turnstile-db (separate crate)                                           │
//! │  └── DbError          - Database failures, NotFound, Busy              │
//! │                                                                         │
//! │  apps/server                                                             │
//! │  └── ApiError         - HTTP status mapping (404/400/409/503)          │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → ApiError → HTTP                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that a reservation *conflict* is not an error in this crate: it is a
//! normal outcome of the Hold Manager, carried as data (`UnitConflict`) so
//! the caller can report every conflicting unit at once.

use thiserror::Error;

/// Reservation request validation failures.
///
/// These map to HTTP 400 at the API edge; they are caught before any
/// database work happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A reservation line requested zero or a negative quantity.
    #[error("Quantity for {unit_id} must be positive, got {quantity}")]
    NonPositiveQuantity { unit_id: String, quantity: i64 },

    /// A reservation line exceeds the per-line quantity bound.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// The request carries more distinct units than allowed.
    #[error("Request cannot have more than {max} units")]
    TooManyLines { max: usize },

    /// The same unit appears more than once in one request.
    #[error("Duplicate unit in request: {unit_id}")]
    DuplicateUnit { unit_id: String },

    /// A seat component contains the seat-id delimiter, which would make the
    /// composite id ambiguous.
    #[error("{field} must not contain '{delimiter}': {value}")]
    InvalidSeatComponent {
        field: String,
        value: String,
        delimiter: char,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::DuplicateUnit {
            unit_id: "A-1-5".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate unit in request: A-1-5");

        let err = ValidationError::InvalidSeatComponent {
            field: "sectionId".to_string(),
            value: "A-1".to_string(),
            delimiter: '-',
        };
        assert_eq!(err.to_string(), "sectionId must not contain '-': A-1");
    }
}
