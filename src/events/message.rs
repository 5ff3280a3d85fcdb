//! Registration message shape and its translation into registry calls.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::EventError;
use crate::registry::RouteRegistry;
use crate::route::{Endpoint, RouteError, Uri};

/// Payload announcing (or withdrawing) one backend instance for a set of routes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegistryMessage {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub uris: Vec<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub private_instance_id: Option<String>,
    #[serde(default)]
    pub stale_threshold_in_seconds: u64,
}

impl RegistryMessage {
    /// Build the endpoint this message describes.
    pub fn endpoint(&self) -> Result<Endpoint, RouteError> {
        let mut endpoint = Endpoint::new(self.host.as_str(), self.port)?
            .with_tags(self.tags.clone())
            .with_stale_threshold(Duration::from_secs(self.stale_threshold_in_seconds));

        if let Some(app) = self.app.as_deref().filter(|a| !a.is_empty()) {
            endpoint = endpoint.with_app_id(app);
        }
        if let Some(id) = self.private_instance_id.as_deref().filter(|i| !i.is_empty()) {
            endpoint = endpoint.with_private_instance_id(id);
        }
        Ok(endpoint)
    }

    /// Normalize every advertised route key. Fails on the first bad one.
    pub fn route_uris(&self) -> Result<Vec<Uri>, RouteError> {
        self.uris.iter().map(Uri::new).collect()
    }
}

/// One line of the event feed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RouteEvent {
    Register(RegistryMessage),
    Unregister(RegistryMessage),
    /// The feed was re-established and will replay registrations.
    Resync,
}

impl RouteEvent {
    /// Parse one JSON feed line.
    pub fn decode(line: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Apply the event. Nothing is mutated unless the whole event is valid.
    pub fn apply(&self, registry: &RouteRegistry) -> Result<(), EventError> {
        match self {
            RouteEvent::Register(message) => {
                let endpoint = message.endpoint()?;
                for uri in message.route_uris()? {
                    registry.register(&uri, endpoint.clone());
                }
            }
            RouteEvent::Unregister(message) => {
                let endpoint = message.endpoint()?;
                for uri in message.route_uris()? {
                    registry.unregister(&uri, &endpoint);
                }
            }
            RouteEvent::Resync => {
                tracing::info!("Event feed resynced, deferring staleness");
                registry.mark_all_updated();
            }
        }
        Ok(())
    }
}
