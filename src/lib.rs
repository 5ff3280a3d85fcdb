//! Route registry for a reverse-proxy gateway.
//!
//! Maps request host/path keys to the live set of backend endpoints,
//! resolves wildcard hosts, and evicts endpoints that stop heartbeating.

pub mod config;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod route;

pub use config::schema::RouterConfig;
pub use lifecycle::Shutdown;
pub use registry::RouteRegistry;
pub use route::{Endpoint, PoolView, Uri};
