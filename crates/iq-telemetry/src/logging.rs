//! Structured logging via `tracing-subscriber`.
//!
//! Every line carries the target and the structured fields of the event.
//! Query events use a consistent field set:
//! - `correlation_id`: id of the query envelope
//! - `namespace`: request namespace
//! - `outcome`: label from `IqError::kind`, or `ok`

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Fails if the filter directive is invalid or a subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {e}", config.log_level)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match (config.console_output, config.json_logs) {
        (false, _) => registry.try_init(),
        (true, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        (true, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(true),
            )
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        log_level = %config.log_level,
        "Logging initialized"
    );

    Ok(())
}

/// Log a query event with the standard fields.
///
/// ```rust,ignore
/// log_query_event!(info, "Query completed", id, "test", elapsed_ms = 3);
/// ```
#[macro_export]
macro_rules! log_query_event {
    ($level:ident, $msg:expr, $correlation_id:expr, $namespace:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            correlation_id = %$correlation_id,
            namespace = %$namespace,
            $($($field)*,)?
            $msg
        )
    };
}
