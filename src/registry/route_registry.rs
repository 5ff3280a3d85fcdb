//! Concurrent route table.
//!
//! # Responsibilities
//! - Map route keys to pools of live endpoints
//! - Resolve lookups through wildcard fallback
//! - Own the background staleness sweep
//! - Report aggregate counts and a diagnostics dump

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::time::Instant;

use crate::config::RegistryConfig;
use crate::observability::metrics;
use crate::registry::pruner::PruningCycle;
use crate::route::{Endpoint, Pool, PoolView, Uri};

/// Pools are built with this fraction of the stale threshold as their
/// retry-after-failure window.
const RETRY_AFTER_FAILURE_DIVISOR: u32 = 4;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to serialize route table: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of one prune pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub pruned_endpoints: usize,
    pub pruned_routes: usize,
}

#[derive(Debug, Default)]
struct RouteTable {
    by_uri: HashMap<Uri, Pool>,
    time_of_last_update: Option<SystemTime>,
}

impl RouteTable {
    fn distinct_endpoints(&self) -> usize {
        let mut addrs: HashSet<&str> = HashSet::new();
        for pool in self.by_uri.values() {
            pool.each(|endpoint| {
                addrs.insert(endpoint.canonical_addr());
            });
        }
        addrs.len()
    }
}

/// The routing table shared by the event feed, the proxy and the sweeper.
#[derive(Debug)]
pub struct RouteRegistry {
    table: RwLock<RouteTable>,
    prune_interval: Duration,
    stale_threshold: Duration,
    pruning: Mutex<Option<PruningCycle>>,
}

impl RouteRegistry {
    /// Create an empty registry.
    ///
    /// A zero `prune_interval` disables the background sweep.
    pub fn new(prune_interval: Duration, stale_threshold: Duration) -> Self {
        Self {
            table: RwLock::new(RouteTable::default()),
            prune_interval,
            stale_threshold,
            pruning: Mutex::new(None),
        }
    }

    /// Registry using the intervals from `config`.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.prune_interval(), config.stale_threshold())
    }

    /// Add or refresh `endpoint` under `uri`, creating the route if needed.
    pub fn register(&self, uri: &Uri, endpoint: Endpoint) {
        let now = SystemTime::now();
        let address = endpoint.canonical_addr().to_string();
        let retry_after_failure = self.stale_threshold / RETRY_AFTER_FAILURE_DIVISOR;

        let is_new = {
            let mut table = self.table.write();
            let pool = table
                .by_uri
                .entry(uri.clone())
                .or_insert_with(|| Pool::new(retry_after_failure));
            let is_new = pool.put(endpoint);
            table.time_of_last_update = Some(now);
            // Gauges are set under the write lock so they follow table order.
            metrics::record_route_count(table.by_uri.len());
            is_new
        };

        if is_new {
            tracing::debug!(uri = %uri, address = %address, "Registered endpoint");
        } else {
            tracing::trace!(uri = %uri, address = %address, "Refreshed endpoint");
        }
        metrics::record_registration();
    }

    /// Remove `endpoint` from `uri`, dropping the route once it is empty.
    /// Unknown routes or endpoints are ignored.
    pub fn unregister(&self, uri: &Uri, endpoint: &Endpoint) {
        let (removed, route_dropped) = {
            let mut table = self.table.write();
            let (removed, now_empty) = match table.by_uri.get_mut(uri) {
                Some(pool) => (pool.remove(endpoint), pool.is_empty()),
                None => (false, false),
            };
            if now_empty {
                table.by_uri.remove(uri);
            }
            if removed {
                metrics::record_route_count(table.by_uri.len());
            }
            (removed, now_empty)
        };

        if !removed {
            tracing::debug!(uri = %uri, address = %endpoint, "Unregister ignored: endpoint not present");
            return;
        }

        tracing::debug!(uri = %uri, address = %endpoint, route_dropped, "Unregistered endpoint");
        metrics::record_unregistration();
    }

    /// Find the pool serving `uri`.
    ///
    /// An exact key wins; otherwise wildcard forms are tried from most to
    /// least specific. `None` means no backend is available.
    pub fn lookup(&self, uri: &Uri) -> Option<PoolView> {
        let table = self.table.read();

        let mut candidate = uri.clone();
        let found = loop {
            if let Some(pool) = table.by_uri.get(&candidate) {
                break Some(pool.view(&candidate));
            }
            match candidate.next_wildcard() {
                Ok(next) => candidate = next,
                Err(_) => break None,
            }
        };
        drop(table);

        metrics::record_lookup(found.is_some());
        found
    }

    /// Back off `canonical_addr` under the route key `uri` (the key reported
    /// by [`PoolView::uri`]). Returns true when the endpoint was present.
    pub fn endpoint_failed(&self, uri: &Uri, canonical_addr: &str) -> bool {
        let mut table = self.table.write();
        let marked = table
            .by_uri
            .get_mut(uri)
            .map(|pool| pool.endpoint_failed(canonical_addr))
            .unwrap_or(false);
        drop(table);

        if marked {
            tracing::debug!(uri = %uri, address = %canonical_addr, "Endpoint marked as failed");
        }
        marked
    }

    /// Start the background sweep. Must be called within a Tokio runtime.
    ///
    /// Does nothing when the prune interval is zero or a cycle is already running.
    pub fn start_pruning_cycle(self: &Arc<Self>) {
        if self.prune_interval.is_zero() {
            tracing::info!("Pruning cycle disabled");
            return;
        }

        let mut pruning = self.pruning.lock();
        if pruning.is_some() {
            tracing::debug!("Pruning cycle already running");
            return;
        }

        *pruning = Some(PruningCycle::spawn(Arc::downgrade(self), self.prune_interval));
        tracing::info!(
            interval_ms = self.prune_interval.as_millis() as u64,
            stale_threshold_ms = self.stale_threshold.as_millis() as u64,
            "Pruning cycle started"
        );
    }

    /// Stop the background sweep and wait for it to exit.
    /// Safe to call when no cycle is running.
    pub async fn stop_pruning_cycle(&self) {
        let cycle = self.pruning.lock().take();
        if let Some(cycle) = cycle {
            if cycle.stop().await {
                tracing::info!("Pruning cycle stopped");
            } else {
                tracing::warn!("Pruning cycle had already exited");
            }
        }
    }

    /// True while a sweep task is alive.
    pub fn is_pruning(&self) -> bool {
        self.pruning
            .lock()
            .as_ref()
            .is_some_and(PruningCycle::is_running)
    }

    /// Number of route keys with at least one endpoint.
    pub fn num_uris(&self) -> usize {
        self.table.read().by_uri.len()
    }

    /// Number of distinct endpoint addresses across all routes.
    pub fn num_endpoints(&self) -> usize {
        self.table.read().distinct_endpoints()
    }

    /// Wall-clock time of the last completed register call.
    pub fn time_of_last_update(&self) -> Option<SystemTime> {
        self.table.read().time_of_last_update
    }

    /// JSON dump of the table: route keys (sorted) to sorted endpoint addresses.
    pub fn to_json(&self) -> Result<Vec<u8>, RegistryError> {
        let table = self.table.read();
        let ordered: BTreeMap<&Uri, &Pool> = table.by_uri.iter().collect();
        Ok(serde_json::to_vec(&ordered)?)
    }

    /// Evict stale endpoints from every pool and drop emptied routes,
    /// in a single pass under the write lock.
    pub fn prune_stale_endpoints(&self) -> PruneReport {
        let mut report = PruneReport::default();

        {
            let mut table = self.table.write();
            let threshold = self.stale_threshold;
            table.by_uri.retain(|uri, pool| {
                let pruned = pool.prune_endpoints(threshold);
                if pruned > 0 {
                    tracing::debug!(uri = %uri, pruned, "Pruned stale endpoints");
                }
                report.pruned_endpoints += pruned;
                if pool.is_empty() {
                    report.pruned_routes += 1;
                    false
                } else {
                    true
                }
            });

            metrics::record_route_count(table.by_uri.len());
            metrics::record_endpoint_count(table.distinct_endpoints());
        }

        if report.pruned_endpoints > 0 {
            tracing::info!(
                pruned_endpoints = report.pruned_endpoints,
                pruned_routes = report.pruned_routes,
                "Pruned stale endpoints"
            );
        }
        metrics::record_pruned(report.pruned_endpoints);
        report
    }

    /// Treat every current endpoint as freshly seen, so a sweep right after
    /// a re-registration burst (e.g. a feed resync) does not evict them.
    pub fn mark_all_updated(&self) {
        let now = Instant::now();
        let mut table = self.table.write();
        for pool in table.by_uri.values_mut() {
            pool.mark_updated(now);
        }
    }
}

impl Drop for RouteRegistry {
    fn drop(&mut self) {
        if let Some(cycle) = self.pruning.get_mut().take() {
            cycle.abort();
        }
    }
}
