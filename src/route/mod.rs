//! Route value types.
//!
//! # Data Flow
//! ```text
//! Raw route string ("Foo.Example.com/api")
//!     → uri.rs (normalize, wildcard generalization)
//!     → Uri key
//!
//! Registration (host, port, tags)
//!     → endpoint.rs (validated Endpoint, canonical address)
//!     → pool.rs (membership + freshness per Uri)
//!     → PoolView snapshot handed to the proxy layer
//! ```
//!
//! # Design Decisions
//! - Uri and Endpoint validate at construction; nothing invalid is stored
//! - Endpoint identity is the canonical address, never the route
//! - Pools carry no lock of their own (the registry owns locking)

pub mod endpoint;
pub mod pool;
pub mod uri;

pub use endpoint::Endpoint;
pub use pool::{Pool, PoolView};
pub use uri::Uri;

use thiserror::Error;

/// Errors produced while constructing route value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route uri must not be empty")]
    EmptyUri,

    #[error("endpoint host must not be empty")]
    EmptyHost,

    #[error("endpoint port must be non-zero")]
    InvalidPort,

    /// No further wildcard generalization exists for this uri.
    #[error("no wildcard generalization left for {0}")]
    WildcardExhausted(String),
}
