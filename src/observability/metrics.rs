//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_registry_uris` (gauge): routes with at least one endpoint
//! - `route_registry_endpoints` (gauge): distinct endpoint addresses, per sweep
//! - `route_registry_registrations_total` (counter)
//! - `route_registry_unregistrations_total` (counter)
//! - `route_registry_pruned_endpoints_total` (counter)
//! - `route_registry_lookups_total` (counter): labelled `result=hit|miss`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter. Must be called within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_registration() {
    metrics::counter!("route_registry_registrations_total").increment(1);
}

pub fn record_unregistration() {
    metrics::counter!("route_registry_unregistrations_total").increment(1);
}

pub fn record_pruned(count: usize) {
    metrics::counter!("route_registry_pruned_endpoints_total").increment(count as u64);
}

pub fn record_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("route_registry_lookups_total", "result" => result).increment(1);
}

pub fn record_route_count(count: usize) {
    metrics::gauge!("route_registry_uris").set(count as f64);
}

pub fn record_endpoint_count(count: usize) {
    metrics::gauge!("route_registry_endpoints").set(count as f64);
}
