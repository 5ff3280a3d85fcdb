//! Backend instance descriptor.
//!
//! # Responsibilities
//! - Represent a single backend instance advertising a route
//! - Expose the canonical address used for dedup in every pool
//!
//! # Design Decisions
//! - Immutable once built; re-registration replaces the whole value
//! - Last-seen timestamps live in the pool, not here

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::route::RouteError;

/// A backend instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    canonical_addr: String,
    app_id: Option<String>,
    private_instance_id: Option<String>,
    tags: BTreeMap<String, String>,
    stale_threshold: Option<Duration>,
}

impl Endpoint {
    /// Create an endpoint for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, RouteError> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(RouteError::EmptyHost);
        }
        if port == 0 {
            return Err(RouteError::InvalidPort);
        }

        Ok(Self {
            canonical_addr: format!("{}:{}", host, port),
            host,
            port,
            app_id: None,
            private_instance_id: None,
            tags: BTreeMap::new(),
            stale_threshold: None,
        })
    }

    /// Owning application id.
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Instance id used for sticky routing.
    pub fn with_private_instance_id(mut self, id: impl Into<String>) -> Self {
        self.private_instance_id = Some(id.into());
        self
    }

    /// Free-form labels carried through to lookups.
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Evict this endpoint sooner than the registry-wide threshold.
    /// A zero duration is ignored.
    pub fn with_stale_threshold(mut self, threshold: Duration) -> Self {
        self.stale_threshold = (!threshold.is_zero()).then_some(threshold);
        self
    }

    /// The `host:port` identity of this endpoint.
    pub fn canonical_addr(&self) -> &str {
        &self.canonical_addr
    }

    /// Host as registered.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Listening port, never zero.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Owning application id, if known.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// Instance id, if the backend reported one.
    pub fn private_instance_id(&self) -> Option<&str> {
        self.private_instance_id.as_deref()
    }

    /// Labels from the registration.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Own staleness limit; `None` means the registry default applies.
    pub fn stale_threshold(&self) -> Option<Duration> {
        self.stale_threshold
    }

    /// Threshold to prune with, given the registry-wide default.
    pub(crate) fn effective_stale_threshold(&self, default: Duration) -> Duration {
        match self.stale_threshold {
            Some(own) if own < default => own,
            _ => default,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_addr() {
        let e = Endpoint::new("10.0.0.1", 8080).unwrap();
        assert_eq!(e.canonical_addr(), "10.0.0.1:8080");
        assert_eq!(e.to_string(), "10.0.0.1:8080");
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(Endpoint::new("", 80), Err(RouteError::EmptyHost));
        assert_eq!(Endpoint::new("  ", 80), Err(RouteError::EmptyHost));
        assert_eq!(Endpoint::new("host", 0), Err(RouteError::InvalidPort));
    }

    #[test]
    fn test_stale_threshold_only_shortens() {
        let default = Duration::from_secs(120);

        let plain = Endpoint::new("h", 1).unwrap();
        assert_eq!(plain.effective_stale_threshold(default), default);

        let short = plain.clone().with_stale_threshold(Duration::from_secs(30));
        assert_eq!(short.effective_stale_threshold(default), Duration::from_secs(30));

        let long = plain.clone().with_stale_threshold(Duration::from_secs(300));
        assert_eq!(long.effective_stale_threshold(default), default);

        let zero = plain.with_stale_threshold(Duration::ZERO);
        assert_eq!(zero.stale_threshold(), None);
    }
}
