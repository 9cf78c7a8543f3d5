//! Runtime configuration: TOML file, then environment, then CLI overrides.

use anyhow::{Context, Result};
use iq_correlator::CorrelatorConfig;
use iq_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behavior of the loopback peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// Delay before each answer.
    pub response_delay_ms: u64,
    /// Queries in this namespace get an error response.
    pub deny_namespace: String,
    /// Queries in this namespace are never answered.
    pub silent_namespace: String,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: 5,
            deny_namespace: "deny".to_string(),
            silent_namespace: "silent".to_string(),
        }
    }
}

/// Full runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub correlator: CorrelatorConfig,
    pub telemetry: TelemetryConfig,
    pub peer: PeerConfig,
}

impl RuntimeConfig {
    /// Configuration from environment variables only.
    pub fn from_env() -> Self {
        Self {
            correlator: CorrelatorConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
            peer: PeerConfig::default(),
        }
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid runtime configuration")
    }

    /// Load from `path`, or from the environment when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::from_env()),
        }
    }
}
