//! Prometheus metrics for query correlation.
//!
//! All metrics follow the naming convention: `iq_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: queries sent, outcomes by label
//! - **Gauge**: queries currently waiting for a response
//! - **Histogram**: send-to-outcome latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Query envelopes handed to the transport
    pub static ref REQUESTS_SENT: IntCounter = IntCounter::new(
        "iq_requests_sent_total",
        "Total query envelopes sent"
    ).expect("metric creation failed");

    /// Query outcomes
    pub static ref OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("iq_outcomes_total", "Query outcomes by kind"),
        &["outcome"]  // ok/error_response/timed_out/canceled/disconnected/...
    ).expect("metric creation failed");

    /// Queries waiting for a response
    pub static ref PENDING_REQUESTS: IntGauge = IntGauge::new(
        "iq_pending_requests",
        "Number of registered response waiters"
    ).expect("metric creation failed");

    /// Round trip from send to outcome
    pub static ref ROUND_TRIP: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "iq_round_trip_seconds",
            "Time from sending a query to its outcome"
        ).buckets(exponential_buckets(0.0001, 2.0, 18).expect("bucket layout"))
    ).expect("metric creation failed");
}

/// Handle proving the collectors are registered.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all collectors with the global registry.
///
/// Calling it again is a no-op.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REQUESTS_SENT.clone()),
        Box::new(OUTCOMES.clone()),
        Box::new(PENDING_REQUESTS.clone()),
        Box::new(ROUND_TRIP.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Count one query sent.
pub fn record_sent() {
    REQUESTS_SENT.inc();
}

/// Count one outcome and observe its round trip.
pub fn record_outcome(outcome: &str, elapsed: Duration) {
    OUTCOMES.with_label_values(&[outcome]).inc();
    ROUND_TRIP.observe(elapsed.as_secs_f64());
}

/// Publish the current number of registered waiters.
pub fn set_pending(pending: usize) {
    PENDING_REQUESTS.set(i64::try_from(pending).unwrap_or(i64::MAX));
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
