//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: RouterConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for every registry duration setting (one week).
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("registry.stale_threshold_secs must be greater than 0 when pruning is enabled")]
    ZeroStaleThreshold,

    #[error("registry.{field} ({secs}) must not exceed {max} seconds")]
    DurationTooLong {
        field: &'static str,
        secs: u64,
        max: u64,
    },

    #[error("registry.start_response_delay_secs ({delay}) must not exceed registry.stale_threshold_secs ({threshold})")]
    StartDelayExceedsThreshold { delay: u64, threshold: u64 },

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Check semantic constraints serde cannot express.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let registry = &config.registry;

    for (field, secs) in [
        ("prune_interval_secs", registry.prune_interval_secs),
        ("stale_threshold_secs", registry.stale_threshold_secs),
        ("start_response_delay_secs", registry.start_response_delay_secs),
    ] {
        if secs > MAX_DURATION_SECS {
            errors.push(ValidationError::DurationTooLong {
                field,
                secs,
                max: MAX_DURATION_SECS,
            });
        }
    }

    if registry.pruning_enabled() {
        if registry.stale_threshold_secs == 0 {
            errors.push(ValidationError::ZeroStaleThreshold);
        } else if registry.start_response_delay_secs > registry.stale_threshold_secs {
            errors.push(ValidationError::StartDelayExceedsThreshold {
                delay: registry.start_response_delay_secs,
                threshold: registry.stale_threshold_secs,
            });
        }
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
