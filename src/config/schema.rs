//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Route table and staleness settings.
    pub registry: RegistryConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Route registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Interval between staleness sweeps in seconds. 0 disables sweeping.
    pub prune_interval_secs: u64,

    /// Time after which an unrefreshed endpoint is evicted, in seconds.
    pub stale_threshold_secs: u64,

    /// Time to wait for the event feed to repopulate routes before
    /// reporting readiness, in seconds.
    pub start_response_delay_secs: u64,
}

impl RegistryConfig {
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }

    pub fn stale_threshold(&self) -> Duration {
        Duration::from_secs(self.stale_threshold_secs)
    }

    pub fn start_response_delay(&self) -> Duration {
        Duration::from_secs(self.start_response_delay_secs)
    }

    pub fn pruning_enabled(&self) -> bool {
        self.prune_interval_secs > 0
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            prune_interval_secs: 30,
            stale_threshold_secs: 120,
            start_response_delay_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
