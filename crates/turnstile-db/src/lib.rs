//! # turnstile-db: Database Layer for Turnstile
//!
//! This crate provides database access for the reservation core. It uses
//! SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Turnstile Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /events/{id}/availability)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    turnstile-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ HoldRepo      │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ AvailRepo     │    │ 001_initial_ │   │   │
//! │  │   │ WAL mode      │    │ BlockRepo     │    │ schema.sql   │   │   │
//! │  │   │               │    │ Capacity/Order│    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (single writer = serializable Reserve)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories: holds (the Hold Manager), availability,
//!   admin blocks, capacity configuration, and the sold ledger

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::availability::{AvailabilityRepository, SeatMap};
pub use repository::block::{BlockRepository, BlockSpec};
pub use repository::capacity::CapacityRepository;
pub use repository::hold::{HoldRepository, ReserveOutcome};
pub use repository::order::OrderRepository;
