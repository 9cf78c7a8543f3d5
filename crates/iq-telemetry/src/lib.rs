//! # IQ Telemetry
//!
//! Structured logging and Prometheus metrics for query correlation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use iq_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _metrics = init_telemetry(&TelemetryConfig::from_env())?;
//! iq_telemetry::record_outcome("ok", elapsed);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IQ_SERVICE_NAME` | `iq-link` | Service name in logs |
//! | `IQ_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `IQ_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `IQ_JSON_LOGS` | `false` | JSON formatted logs |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, record_outcome, record_sent, register_metrics, set_pending, MetricsHandle,
    OUTCOMES, PENDING_REQUESTS, REQUESTS_SENT, ROUND_TRIP,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the logging subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<MetricsHandle, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;
    Ok(metrics)
}
