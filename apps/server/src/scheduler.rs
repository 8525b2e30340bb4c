//! Background sweep of expired cache entries.
//!
//! Reads already drop stale entries lazily; the sweep bounds memory for keys
//! that are never read again (one-off search symbols, mistyped lookups).

use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::main_lib::AppState;

/// Starts the cache sweeper, ticking once per cache TTL.
pub fn start_cache_sweeper(state: Arc<AppState>) {
    let period = state.market.cache_ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        info!("Cache sweeper started ({}s interval)", period.as_secs());

        let mut sweep_interval = interval(period);
        sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick is immediate and the cache is empty
        sweep_interval.tick().await;

        loop {
            sweep_interval.tick().await;
            run_sweep(&state);
        }
    });
}

fn run_sweep(state: &AppState) -> usize {
    let removed = state.market.purge_expired();
    if removed > 0 {
        debug!("Swept {} expired cache entries", removed);
    }
    removed
}
