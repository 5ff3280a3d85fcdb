//! Background staleness sweep.
//!
//! # Responsibilities
//! - Periodically run the registry's prune pass
//! - Stop synchronously: once `stop` returns, no further sweep runs

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lifecycle::Shutdown;
use crate::registry::RouteRegistry;

/// Longest period the timer is armed with. Longer intervals are clamped so
/// the first deadline always fits in an `Instant`.
pub(crate) const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Handle to a running sweep task.
#[derive(Debug)]
pub(crate) struct PruningCycle {
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl PruningCycle {
    /// Spawn the sweep loop. Must be called within a Tokio runtime.
    ///
    /// The task holds a weak reference, so it ends on its own once the
    /// registry is dropped.
    pub(crate) fn spawn(weak: Weak<RouteRegistry>, interval: Duration) -> Self {
        if interval > MAX_SWEEP_INTERVAL {
            tracing::warn!(
                requested_secs = interval.as_secs(),
                max_secs = MAX_SWEEP_INTERVAL.as_secs(),
                "Prune interval clamped"
            );
        }
        let interval = interval.min(MAX_SWEEP_INTERVAL);
        let shutdown = Shutdown::new();
        let mut stop = shutdown.subscribe();

        let handle = tokio::spawn(async move {
            let start = Instant::now()
                .checked_add(interval)
                .unwrap_or_else(Instant::now);
            let mut ticker = time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(registry) = weak.upgrade() else {
                            break;
                        };
                        tracing::debug!("Start to check and prune stale endpoints");
                        registry.prune_stale_endpoints();
                    }
                    _ = stop.recv() => {
                        break;
                    }
                }
            }

            tracing::debug!("Pruning cycle exited");
        });

        Self { shutdown, handle }
    }

    /// Signal the loop and wait for it to exit. Returns false when the task
    /// had died on its own.
    pub(crate) async fn stop(self) -> bool {
        if self.shutdown.trigger() == 0 {
            tracing::debug!("Pruning cycle no longer listening");
        }
        match self.handle.await {
            Ok(()) => true,
            Err(e) => {
                if e.is_panic() {
                    tracing::error!(error = %e, "Pruning cycle panicked");
                }
                false
            }
        }
    }

    /// True while the sweep task is alive.
    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub(crate) fn abort(&self) {
        self.handle.abort();
    }
}
