//! # IQ Runtime
//!
//! ```text
//! iq-runtime [--config iq.toml] [--queries 32] [--timeout-ms 500] [--json-logs]
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use iq_runtime::RuntimeConfig;

/// Correlated query round trips over an in-memory link.
#[derive(Parser, Debug)]
#[command(name = "iq-runtime")]
#[command(about = "Issue correlated queries against a loopback peer")]
struct Args {
    /// TOML configuration file (defaults come from the environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of concurrent queries
    #[arg(short, long, default_value = "16")]
    queries: usize,

    /// Default query timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Emit JSON formatted logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RuntimeConfig::load(args.config.as_deref())?;
    if let Some(timeout_ms) = args.timeout_ms {
        config.correlator.default_timeout_ms = timeout_ms;
    }
    if args.json_logs {
        config.telemetry.json_logs = true;
    }

    iq_telemetry::init_telemetry(&config.telemetry)?;
    info!(
        version = iq_correlator::VERSION,
        default_timeout_ms = config.correlator.default_timeout_ms,
        queries = args.queries,
        "Starting IQ runtime"
    );

    let summary = match iq_runtime::run(config, args.queries).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Runtime failed");
            return Err(e);
        }
    };

    println!("{}", summary.report);
    println!(
        "peer answered {}, listener received {} ({} unhandled), {} released on close",
        summary.answered,
        summary.listener.received,
        summary.listener.unhandled,
        summary.released_on_close
    );
    print!("{}", iq_telemetry::encode_metrics()?);

    Ok(())
}
