//! Background maintenance loop.
//!
//! Periodically expires stale resource claims and marks silent instances
//! offline. The loop shares the coordinator lock with request handling, so
//! a sweep never observes a half-applied operation.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::coordinator::Coordinator;

/// Spawn the periodic sweep task. Returns its join handle; the task exits
/// when `shutdown` fires.
pub fn spawn_sweeper(
    coordinator: Arc<Coordinator>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    let period = coordinator.config().sweep_interval();
    tokio::spawn(async move {
        info!("Sweeper started (interval: {:?})", period);
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so a fresh server does
        // not sweep before anything could have expired.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = coordinator.sweep().await;
                    if report.expired_claims > 0 || report.stale_instances > 0 {
                        info!(
                            "Sweep released {} expired claim(s), marked {} instance(s) offline",
                            report.expired_claims, report.stale_instances
                        );
                    } else {
                        debug!("Sweep pass: nothing to do");
                    }
                }
                _ = shutdown.recv() => {
                    info!("Sweeper shutting down");
                    break;
                }
            }
        }
    })
}
