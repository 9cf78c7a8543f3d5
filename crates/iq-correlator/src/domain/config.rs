//! Correlator configuration with validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default bounded wait for a query response.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid id prefix: {0}")]
    InvalidPrefix(String),

    #[error("invalid link buffer: {0}")]
    InvalidBuffer(String),
}

/// Session-level correlator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorConfig {
    /// Bounded wait applied when a query sets no timeout of its own.
    pub default_timeout_ms: u64,

    /// Fixed session prefix for generated ids. Random when unset.
    pub id_prefix: Option<String>,

    /// Frames buffered per direction on an in-memory link.
    pub link_buffer: usize,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_QUERY_TIMEOUT.as_millis() as u64,
            id_prefix: None,
            link_buffer: shared_bus::DEFAULT_LINK_BUFFER,
        }
    }
}

impl CorrelatorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `IQ_DEFAULT_TIMEOUT_MS`: Default query timeout (default: 60000)
    /// - `IQ_ID_PREFIX`: Session id prefix (default: random)
    /// - `IQ_LINK_BUFFER`: In-memory link buffer (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_timeout_ms: env::var("IQ_DEFAULT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_timeout_ms),
            id_prefix: env::var("IQ_ID_PREFIX").ok().or(defaults.id_prefix),
            link_buffer: env::var("IQ_LINK_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.link_buffer),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "default_timeout_ms cannot be 0".into(),
            ));
        }

        if let Some(prefix) = &self.id_prefix {
            if prefix.is_empty() {
                return Err(ConfigError::InvalidPrefix("prefix cannot be empty".into()));
            }
            // A trailing digit would let "1" + "12" collide with "11" + "2".
            if prefix.ends_with(|c: char| c.is_ascii_digit()) {
                return Err(ConfigError::InvalidPrefix(format!(
                    "prefix '{prefix}' must not end with a digit"
                )));
            }
        }

        if self.link_buffer == 0 {
            return Err(ConfigError::InvalidBuffer("link_buffer cannot be 0".into()));
        }

        Ok(())
    }

    /// Default timeout as a `Duration`.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Builder-style method to set the default timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder-style method to pin the session id prefix.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }
}
