//! Startup readiness.
//!
//! After start the registry is empty until the event feed has replayed the
//! current routes. Readiness is reported only after the start-response delay,
//! so probes do not see a half-populated table.

use std::time::Duration;

use crate::registry::RouteRegistry;

/// Table state at the moment the process declares itself ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyReport {
    pub uris: usize,
    pub endpoints: usize,
    pub has_updates: bool,
}

/// Wait out the start-response delay, then report the table size.
pub async fn await_start_response_delay(registry: &RouteRegistry, delay: Duration) -> ReadyReport {
    if !delay.is_zero() {
        tracing::info!(delay_ms = delay.as_millis() as u64, "Waiting for route registrations");
        tokio::time::sleep(delay).await;
    }

    let report = ReadyReport {
        uris: registry.num_uris(),
        endpoints: registry.num_endpoints(),
        has_updates: registry.time_of_last_update().is_some(),
    };

    tracing::info!(
        uris = report.uris,
        endpoints = report.endpoints,
        has_updates = report.has_updates,
        "Route registry ready"
    );
    report
}
