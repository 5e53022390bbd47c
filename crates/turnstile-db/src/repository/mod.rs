//! # Repository Layer
//!
//! One repository per concern:
//!
//! - [`capacity`] - event/tier/seat configuration (the Capacity Source)
//! - [`order`] - the external order store and the Sold Ledger read
//! - [`block`] - operator admin blocks + inventory audit log
//! - [`hold`] - the Hold Manager: reserve/release/sweep
//! - [`availability`] - the Availability Calculator (snapshot reads)
//!
//! [`counts`] holds the shared count queries both the Hold Manager (inside
//! its transaction) and the Availability Calculator (on a plain connection)
//! run, so the two can never disagree about what "sold", "blocked" or
//! "live-held" means.

pub mod availability;
pub mod block;
pub mod capacity;
pub(crate) mod counts;
pub mod hold;
pub mod order;
