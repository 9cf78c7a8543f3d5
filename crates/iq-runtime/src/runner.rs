//! Issue a batch of concurrent queries and tally their outcomes.

use futures::future::join_all;
use iq_correlator::{InfoQuery, IqError, IqSession};
use iq_telemetry::log_query_event;
use shared_types::Jid;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome counts for one batch, keyed by `ok` or `IqError::kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: BTreeMap<&'static str, u64>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn count(&self, outcome: &str) -> u64 {
        self.outcomes.get(outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.outcomes.values().sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} queries in {:?}:", self.total(), self.elapsed)?;
        for (outcome, count) in &self.outcomes {
            write!(f, " {outcome}={count}")?;
        }
        Ok(())
    }
}

/// Namespace for the `n`th query: mostly `test`, with every 5th denied and
/// every 7th left unanswered.
pub fn namespace_for(n: usize, deny: &str, silent: &str) -> String {
    if n % 7 == 6 {
        silent.to_string()
    } else if n % 5 == 4 {
        deny.to_string()
    } else {
        "test".to_string()
    }
}

/// Send `count` queries concurrently through `session` and wait for all.
pub async fn run_queries(
    session: Arc<IqSession>,
    count: usize,
    to: Jid,
    deny: &str,
    silent: &str,
) -> RunReport {
    let started = Instant::now();

    let tasks = (0..count).map(|n| {
        let session = Arc::clone(&session);
        let namespace = namespace_for(n, deny, silent);
        let query = if n % 2 == 0 {
            InfoQuery::get(namespace, to.clone())
        } else {
            InfoQuery::set(namespace, to.clone())
        };
        async move {
            let sent_at = Instant::now();
            iq_telemetry::record_sent();
            let namespace = query.namespace.clone();
            let outcome = session.query(query).await;
            let label = outcome_label(&outcome);
            iq_telemetry::record_outcome(label, sent_at.elapsed());
            iq_telemetry::set_pending(session.pending_count());

            match &outcome {
                Ok(node) => {
                    log_query_event!(debug, "Query answered", node.attr_str("id").unwrap_or_default(), namespace)
                }
                Err(e) => log_query_event!(debug, "Query failed", n, namespace, error = %e),
            }
            label
        }
    });

    let mut report = RunReport::default();
    for label in join_all(tasks).await {
        *report.outcomes.entry(label).or_default() += 1;
    }
    report.elapsed = started.elapsed();
    report
}

fn outcome_label(outcome: &Result<shared_types::Node, IqError>) -> &'static str {
    match outcome {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    }
}
