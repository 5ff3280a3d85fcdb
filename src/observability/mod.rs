//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, pruner, event intake produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric updates are cheap enough for the lookup hot path
//! - Endpoint gauge is refreshed per sweep, not per mutation

pub mod logging;
pub mod metrics;
