//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use route_registry::{Endpoint, RouteRegistry, Uri};

pub fn uri(raw: &str) -> Uri {
    Uri::new(raw).unwrap()
}

pub fn endpoint(host: &str, port: u16) -> Endpoint {
    Endpoint::new(host, port).unwrap()
}

/// Registry with the background sweep disabled.
pub fn manual_registry(stale_threshold: Duration) -> RouteRegistry {
    RouteRegistry::new(Duration::ZERO, stale_threshold)
}

pub fn pruning_registry(interval: Duration, stale_threshold: Duration) -> Arc<RouteRegistry> {
    Arc::new(RouteRegistry::new(interval, stale_threshold))
}

/// Assert the diagnostics dump holds no route without endpoints.
pub fn assert_no_empty_routes(registry: &RouteRegistry) {
    let dump: serde_json::Value = serde_json::from_slice(&registry.to_json().unwrap()).unwrap();
    let routes = dump.as_object().expect("dump is a JSON object");
    for (route, addrs) in routes {
        let addrs = addrs.as_array().expect("route maps to an array");
        assert!(!addrs.is_empty(), "route {route} has no endpoints");
    }
}
