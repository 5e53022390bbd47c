//! Turnstile HTTP server library.
//!
//! Everything lives here so integration tests can build the router against
//! an in-memory database; `main.rs` is just the executable shell.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod sweeper;

pub use config::ServerConfig;
pub use router::create_router;
pub use state::AppState;
