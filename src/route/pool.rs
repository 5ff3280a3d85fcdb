//! Per-route endpoint set.
//!
//! # Responsibilities
//! - Track the endpoints registered under one route, keyed by canonical address
//! - Stamp each endpoint with its last-seen time
//! - Evict endpoints whose last-seen time exceeds the stale threshold
//! - Back off endpoints reported as failed for a short window
//!
//! # Design Decisions
//! - No internal lock: every call happens under the registry's lock
//! - Timestamps use `tokio::time::Instant` so tests can drive a paused clock
//! - A pool-wide freshness floor (`mark_updated`) avoids touching every entry

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use tokio::time::Instant;

use crate::route::{Endpoint, Uri};

#[derive(Debug)]
struct PoolEntry {
    endpoint: Arc<Endpoint>,
    updated: Instant,
    failed_at: Option<Instant>,
}

/// The set of endpoints currently registered for one route.
#[derive(Debug)]
pub struct Pool {
    entries: HashMap<String, PoolEntry>,
    /// How long a failed endpoint stays backed off.
    retry_after_failure: Duration,
    /// Effective last-seen floor for every entry.
    updated_floor: Option<Instant>,
}

impl Pool {
    /// Empty pool whose failed endpoints are skipped for `retry_after_failure`.
    pub fn new(retry_after_failure: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            retry_after_failure,
            updated_floor: None,
        }
    }

    /// Insert or refresh an endpoint. Returns true when the address was new.
    ///
    /// Refreshing replaces the stored metadata, stamps the entry with "now"
    /// and clears any failure mark.
    pub fn put(&mut self, endpoint: Endpoint) -> bool {
        let now = Instant::now();
        let endpoint = Arc::new(endpoint);

        match self.entries.get_mut(endpoint.canonical_addr()) {
            Some(entry) => {
                entry.endpoint = endpoint;
                entry.updated = now;
                entry.failed_at = None;
                false
            }
            None => {
                self.entries.insert(
                    endpoint.canonical_addr().to_string(),
                    PoolEntry {
                        endpoint,
                        updated: now,
                        failed_at: None,
                    },
                );
                true
            }
        }
    }

    /// Remove an endpoint by canonical address. Returns true when it was present.
    pub fn remove(&mut self, endpoint: &Endpoint) -> bool {
        self.entries.remove(endpoint.canonical_addr()).is_some()
    }

    /// True when no endpoint remains.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of endpoints in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when an endpoint with `canonical_addr` is present.
    pub fn contains(&self, canonical_addr: &str) -> bool {
        self.entries.contains_key(canonical_addr)
    }

    /// Apply `f` to every endpoint, in no particular order.
    pub fn each<'a, F: FnMut(&'a Endpoint)>(&'a self, mut f: F) {
        for entry in self.entries.values() {
            f(&entry.endpoint);
        }
    }

    /// Drop every endpoint not seen within its stale threshold.
    /// Returns the number of endpoints removed.
    pub fn prune_endpoints(&mut self, default_threshold: Duration) -> usize {
        let now = Instant::now();
        let floor = self.updated_floor;
        let before = self.entries.len();

        self.entries.retain(|_, entry| {
            let last_seen = match floor {
                Some(floor) if floor > entry.updated => floor,
                _ => entry.updated,
            };
            let threshold = entry.endpoint.effective_stale_threshold(default_threshold);
            now.saturating_duration_since(last_seen) <= threshold
        });

        before - self.entries.len()
    }

    /// Treat every endpoint as seen no earlier than `now`.
    pub fn mark_updated(&mut self, now: Instant) {
        self.updated_floor = Some(now);
    }

    /// Back off an endpoint for the retry window. Returns true when it was present.
    pub fn endpoint_failed(&mut self, canonical_addr: &str) -> bool {
        match self.entries.get_mut(canonical_addr) {
            Some(entry) => {
                entry.failed_at = Some(Instant::now());
                true
            }
            None => false,
        }
    }

    /// Read-only snapshot of this pool, as matched under `uri`.
    pub fn view(&self, uri: &Uri) -> PoolView {
        let now = Instant::now();
        let mut members: Vec<Member> = self
            .entries
            .values()
            .map(|entry| Member {
                endpoint: entry.endpoint.clone(),
                backed_off: entry
                    .failed_at
                    .map(|at| now.saturating_duration_since(at) < self.retry_after_failure)
                    .unwrap_or(false),
            })
            .collect();
        members.sort_by(|a, b| a.endpoint.canonical_addr().cmp(b.endpoint.canonical_addr()));

        PoolView {
            uri: uri.clone(),
            members,
        }
    }

    fn sorted_addrs(&self) -> Vec<&str> {
        let mut addrs: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        addrs.sort_unstable();
        addrs
    }
}

impl Serialize for Pool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let addrs = self.sorted_addrs();
        let mut seq = serializer.serialize_seq(Some(addrs.len()))?;
        for addr in addrs {
            seq.serialize_element(addr)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone)]
struct Member {
    endpoint: Arc<Endpoint>,
    backed_off: bool,
}

/// Snapshot of a pool returned by a registry lookup.
///
/// Later registry mutations are not reflected here.
#[derive(Debug, Clone)]
pub struct PoolView {
    uri: Uri,
    members: Vec<Member>,
}

impl PoolView {
    /// The route key that matched (exact or wildcard).
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Endpoints in the snapshot, backed off or not.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True for an empty snapshot.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All endpoints, sorted by canonical address.
    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.members.iter().map(|m| &m.endpoint)
    }

    /// True when the snapshot holds `canonical_addr`.
    pub fn contains(&self, canonical_addr: &str) -> bool {
        self.endpoints().any(|e| e.canonical_addr() == canonical_addr)
    }

    /// Endpoint registered with instance id `id`.
    pub fn find_by_private_instance_id(&self, id: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints().find(|e| e.private_instance_id() == Some(id))
    }

    /// Endpoints not currently backed off after a failure.
    /// If every endpoint is backed off, all of them are returned.
    pub fn available(&self) -> Vec<Arc<Endpoint>> {
        let healthy: Vec<Arc<Endpoint>> = self
            .members
            .iter()
            .filter(|m| !m.backed_off)
            .map(|m| m.endpoint.clone())
            .collect();

        if healthy.is_empty() {
            self.endpoints().cloned().collect()
        } else {
            healthy
        }
    }
}
