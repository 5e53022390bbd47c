//! Periodic expiry sweeper.
//!
//! Deletes expired holds on a fixed interval. Pure housekeeping: both the
//! availability reads and the reserve transaction filter on `held_until`
//! themselves, so a missed or failed sweep never affects correctness, only
//! the size of the holds table. Failures are logged and the loop keeps
//! going.

use std::time::Duration;

use tracing::{debug, warn};

use turnstile_db::Database;

pub async fn run(db: Database, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick fires immediately; skip straight to steady state.
    interval.tick().await;

    loop {
        interval.tick().await;
        match db.holds().sweep_all_expired().await {
            Ok(removed) if removed > 0 => {
                debug!(removed, "Expiry sweep removed holds");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "Expiry sweep failed, will retry next interval");
            }
        }
    }
}
