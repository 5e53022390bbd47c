//! # turnstile-core: Pure Reservation Domain for Turnstile
//!
//! This crate is the **heart** of the reservation core. It defines what a
//! sellable unit is, what a hold is, and how availability is computed, all
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Turnstile Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Checkout Clients (HTTP)                      │   │
//! │  │    GET availability ──► POST reserve ──► DELETE release        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ turnstile-core (THIS CRATE) ★                    │   │
//! │  │                                                                  │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌───────────┐  ┌──────────┐ │   │
//! │  │   │   types   │  │ availability │  │validation │  │  error   │ │   │
//! │  │   │ Sellable  │  │ capacity -   │  │  reserve  │  │  typed   │ │   │
//! │  │   │ Unit,Hold │  │ sold-blocked │  │  request  │  │  errors  │ │   │
//! │  │   │ AdminBlock│  │ -held math   │  │  rules    │  │          │ │   │
//! │  │   └───────────┘  └──────────────┘  └───────────┘  └──────────┘ │   │
//! │  │                                                                  │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  turnstile-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, the Reserve transaction      │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (SellableUnit, Hold, AdminBlock, ...)
//! - [`availability`] - Availability arithmetic (the no-overselling math)
//! - [`error`] - Domain error types
//! - [`validation`] - Reservation request validation
//!
//! ## The Invariant
//!
//! Per sellable unit, per event, at all times:
//!
//! ```text
//! sold + blocked + Σ(live hold quantities) ≤ capacity
//! ```
//!
//! The Hold Manager in `turnstile-db` is the sole enforcer of this invariant
//! at write time; the Availability Calculator is the sole reader that
//! exposes it. Everything in this crate exists to make that one inequality
//! easy to state, test, and re-derive.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::{EventAvailability, UnitAvailability};
pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How long a checkout hold lives, in milliseconds (5 minutes).
///
/// ## Why a constant?
/// The hold timeout is data-driven (each hold stores its own absolute
/// `held_until`), so changing this value never touches existing holds. The
/// server may override it via configuration; this is the contract default.
pub const DEFAULT_HOLD_DURATION_MS: i64 = 5 * 60 * 1000;

/// Maximum quantity a single reservation line may request.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10) and
/// bounds the damage a misbehaving client can do to an event's inventory.
pub const MAX_LINE_QUANTITY: i64 = 100;

/// Maximum number of distinct units in a single reservation request.
///
/// ## Business Reason
/// A checkout touches a handful of tiers or seats; anything larger is a bug
/// or abuse, and bounding it keeps the reserve transaction short.
pub const MAX_REQUEST_LINES: usize = 50;
