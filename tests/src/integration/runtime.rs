//! # Runtime Flows
//!
//! The runnable node wiring: session, listener and loopback peer together.

#[cfg(test)]
mod tests {
    use iq_runtime::{run, PeerConfig, RuntimeConfig};

    fn config(timeout_ms: u64) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.correlator.default_timeout_ms = timeout_ms;
        config.correlator.id_prefix = Some("rt-".into());
        config.peer = PeerConfig {
            response_delay_ms: 1,
            ..PeerConfig::default()
        };
        config
    }

    #[tokio::test]
    async fn test_runtime_outcome_mix() {
        let summary = run(config(150), 35).await.unwrap();
        let report = &summary.report;

        // Silent: n % 7 == 6. Denied: n % 5 == 4 and not silent.
        let silent = (0..35).filter(|n| n % 7 == 6).count() as u64;
        let denied = (0..35).filter(|n| n % 7 != 6 && n % 5 == 4).count() as u64;

        assert_eq!(report.total(), 35);
        assert_eq!(report.count("timed_out"), silent);
        assert_eq!(report.count("error_response"), denied);
        assert_eq!(report.count("ok"), 35 - silent - denied);
        assert_eq!(summary.answered, 35 - silent);
        assert_eq!(summary.listener.received, 35 - silent);
        assert_eq!(summary.listener.unhandled, 0);
    }

    #[tokio::test]
    async fn test_runtime_rejects_invalid_config() {
        let err = run(config(0), 1).await.unwrap_err();
        assert!(err.to_string().contains("invalid correlator configuration"));
    }

    #[tokio::test]
    async fn test_runtime_zero_queries() {
        let summary = run(config(100), 0).await.unwrap();
        assert_eq!(summary.report.total(), 0);
        assert_eq!(summary.answered, 0);
    }
}
