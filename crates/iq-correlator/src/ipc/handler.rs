//! Bounded wait: dispatch a query, then race the response against the
//! caller's cancellation and the timeout.

use crate::domain::error::IqError;
use crate::domain::pending::WaiterSignal;
use crate::domain::query::{InfoQuery, IqType};
use crate::ipc::dispatcher::{IqDispatcher, PendingIq};
use shared_types::{attrs, Node, IQ_TAG};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Sends queries and waits for their classified outcome.
pub struct IqHandler {
    dispatcher: IqDispatcher,
    default_timeout: Duration,
}

impl IqHandler {
    pub fn new(dispatcher: IqDispatcher, default_timeout: Duration) -> Self {
        Self {
            dispatcher,
            default_timeout,
        }
    }

    /// Send `query` and wait for its response.
    ///
    /// Whichever happens first decides the outcome: a response, the query's
    /// cancellation token, or the timeout (the query's own, else the default).
    /// On cancellation or timeout the waiter is released before returning.
    pub async fn query(&self, query: InfoQuery) -> Result<Node, IqError> {
        let timeout = query
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(self.default_timeout);
        let cancellation = query.cancellation.clone().unwrap_or_default();

        let PendingIq { id, waiter } = self.dispatcher.dispatch(&query).await?;
        let registry = self.dispatcher.registry();
        let started = Instant::now();

        tokio::select! {
            biased;

            signal = waiter => {
                let outcome = classify_signal(signal);
                debug!(
                    correlation_id = %id,
                    namespace = %query.namespace,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = outcome.is_ok(),
                    "Query completed"
                );
                outcome
            }

            _ = cancellation.cancelled() => {
                registry.cancel(&id);
                debug!(correlation_id = %id, namespace = %query.namespace, "Query canceled by caller");
                Err(IqError::Canceled)
            }

            _ = tokio::time::sleep(timeout) => {
                registry.cancel(&id);
                registry.record_timeout();
                warn!(
                    correlation_id = %id,
                    namespace = %query.namespace,
                    timeout_ms = timeout.as_millis() as u64,
                    "Query timed out"
                );
                Err(IqError::TimedOut(timeout))
            }
        }
    }

    /// Send `query` without waiting.
    pub async fn query_async(&self, query: &InfoQuery) -> Result<PendingIq, IqError> {
        self.dispatcher.dispatch(query).await
    }

    pub fn dispatcher(&self) -> &IqDispatcher {
        &self.dispatcher
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

/// Wait for a pending query without a timeout, honoring `cancellation`.
///
/// For callers that took the [`IqHandler::query_async`] path.
pub async fn await_pending(
    pending: PendingIq,
    cancellation: &CancellationToken,
) -> Result<Node, IqError> {
    tokio::select! {
        biased;
        signal = pending.waiter => classify_signal(signal),
        _ = cancellation.cancelled() => Err(IqError::Canceled),
    }
}

fn classify_signal(signal: WaiterSignal) -> Result<Node, IqError> {
    match signal {
        WaiterSignal::Response(node) => classify_response(node),
        WaiterSignal::Canceled => Err(IqError::Canceled),
        WaiterSignal::Disconnected => Err(IqError::Disconnected),
    }
}

/// Classify a correlated response.
///
/// `<iq type="result">` is success, `<iq type="error">` is an error response
/// carrying the `<error/>` child's code and text, anything else is unexpected.
pub fn classify_response(node: Node) -> Result<Node, IqError> {
    let iq_type = node
        .attr_str(attrs::TYPE)
        .and_then(|t| t.parse::<IqType>().ok());

    match (node.tag == IQ_TAG, iq_type) {
        (true, Some(IqType::Result)) => Ok(node),
        (true, Some(IqType::Error)) => {
            let error = node.child_by_tag("error");
            let code = error.and_then(|e| e.attr_i64("code"));
            let text = error.and_then(|e| e.attr_str("text")).map(str::to_string);
            Err(IqError::ErrorResponse {
                code,
                text,
                rendered: node.to_xml(),
                response: Box::new(node),
            })
        }
        _ => Err(IqError::UnexpectedResponse {
            tag: node.tag.clone(),
            iq_type: node.attr_str(attrs::TYPE).unwrap_or_default().to_string(),
            response: Box::new(node),
        }),
    }
}
