//! Route event intake.
//!
//! # Data Flow
//! ```text
//! Feed line (JSON)
//!     → message.rs (decode RouteEvent, build Uri + Endpoint)
//!     → RouteRegistry register / unregister / mark_all_updated
//!
//! intake.rs:
//!     AsyncBufRead (stdin in the binary)
//!     → one event per line until EOF or shutdown
//! ```
//!
//! # Design Decisions
//! - A bad line is logged and skipped; the intake keeps running
//! - An event is fully validated before it touches the registry

pub mod intake;
pub mod message;

pub use intake::{EventIntake, IntakeStats};
pub use message::{RegistryMessage, RouteEvent};

use thiserror::Error;

use crate::route::RouteError;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid route in event: {0}")]
    Route(#[from] RouteError),

    #[error("failed to read event feed: {0}")]
    Io(#[from] std::io::Error),
}
