//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build registry → Start pruning → Start event intake
//!     → Wait start-response delay → Report ready
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop event intake → Stop pruning cycle → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Background tasks subscribe to one broadcast shutdown channel
//! - The pruning cycle is stopped (and awaited) before exit

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
