//! Route registry subsystem.
//!
//! # Data Flow
//! ```text
//! Event feed (register / unregister)
//!     → route_registry.rs (write lock)
//!     → Pool put / remove, empty pools dropped
//!
//! Inbound request
//!     → route_registry.rs lookup (read lock)
//!     → exact key, then wildcard fallback (*.b.c, *.c)
//!     → PoolView snapshot or None
//!
//! Background (pruner.rs):
//!     Periodic timer
//!     → sweep every pool under the write lock
//!     → stale endpoints and empty routes removed
//! ```
//!
//! # Design Decisions
//! - One reader/writer lock over the whole table; sweeps are atomic
//! - The sweep task handle has its own lock, separate from the table lock
//! - Lookup returns an owned snapshot, never a reference into the table

pub mod pruner;
pub mod route_registry;

pub use route_registry::{PruneReport, RegistryError, RouteRegistry};
