//! Layered defaults for newly built events.
//!
//! Configuration is loaded with figment from (later sources win):
//! 1. Compiled-in defaults
//! 2. Config file: `edge-event.toml` in the working directory (optional)
//! 3. Environment variables prefixed with `EDGE_EVENT_`
//!
//! | Variable | Field |
//! |----------|-------|
//! | `EDGE_EVENT_CLIENT_IP` | `client_ip` |
//! | `EDGE_EVENT_URI` | `uri` |
//! | `EDGE_EVENT_DISTRIBUTION_DOMAIN_NAME` | `distribution_domain_name` |
//! | `EDGE_EVENT_DISTRIBUTION_ID` | `distribution_id` |
//! | `EDGE_EVENT_REQUEST_ID` | `request_id` |
//! | `EDGE_EVENT_GENERATE_REQUEST_ID` | `generate_request_id` |

use crate::error::Result;
use crate::event::DEFAULT_CLIENT_IP;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

const DEFAULT_CONFIG_PATH: &str = "edge-event.toml";
const ENV_PREFIX: &str = "EDGE_EVENT_";

/// Defaults applied by `EventBuilder::with_defaults`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDefaults {
    /// Viewer IP address.
    pub client_ip: String,
    /// Request path; normalized like the `uri` setter.
    pub uri: String,
    /// CloudFront distribution domain.
    pub distribution_domain_name: Option<String>,
    /// CloudFront distribution id.
    pub distribution_id: Option<String>,
    /// Fixed request id.
    pub request_id: Option<String>,
    /// Generate a random request id when `request_id` is unset.
    pub generate_request_id: bool,
}

impl Default for EventDefaults {
    fn default() -> Self {
        Self {
            client_ip: DEFAULT_CLIENT_IP.to_string(),
            uri: "/".to_string(),
            distribution_domain_name: None,
            distribution_id: None,
            request_id: None,
            generate_request_id: false,
        }
    }
}

impl EventDefaults {
    /// Loads defaults from `edge-event.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeEventError::Config`](crate::EdgeEventError::Config) if a
    /// source cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Loads defaults from a custom config file path and the environment.
    ///
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeEventError::Config`](crate::EdgeEventError::Config) if a
    /// source cannot be parsed.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EventDefaults::default()));

        if config_path.as_ref().exists() {
            figment = figment.merge(Toml::file(config_path));
        }

        let defaults = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(defaults)
    }

    /// Creates a builder for programmatic configuration.
    pub fn builder() -> EventDefaultsBuilder {
        EventDefaultsBuilder::new()
    }

    /// The request id to stamp on a new event.
    pub fn resolve_request_id(&self) -> Option<String> {
        match &self.request_id {
            Some(id) => Some(id.clone()),
            None if self.generate_request_id => Some(Uuid::new_v4().to_string()),
            None => None,
        }
    }
}

/// Builder for [`EventDefaults`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing unless .build() is called"]
pub struct EventDefaultsBuilder {
    defaults: EventDefaults,
}

impl EventDefaultsBuilder {
    /// Starts from the compiled-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the viewer IP address.
    pub fn client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.defaults.client_ip = client_ip.into();
        self
    }

    /// Sets the request path.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.defaults.uri = uri.into();
        self
    }

    /// Sets the distribution domain.
    pub fn distribution_domain_name(mut self, name: impl Into<String>) -> Self {
        self.defaults.distribution_domain_name = Some(name.into());
        self
    }

    /// Sets the distribution id.
    pub fn distribution_id(mut self, id: impl Into<String>) -> Self {
        self.defaults.distribution_id = Some(id.into());
        self
    }

    /// Sets a fixed request id.
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.defaults.request_id = Some(id.into());
        self
    }

    /// Enables random request ids.
    pub fn generate_request_id(mut self, generate: bool) -> Self {
        self.defaults.generate_request_id = generate;
        self
    }

    /// Builds the defaults.
    pub fn build(self) -> EventDefaults {
        self.defaults
    }
}
