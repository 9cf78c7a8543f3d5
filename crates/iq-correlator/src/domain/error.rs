//! Correlator error types.
//!
//! Every way a query can end other than a `result` response maps to one
//! `IqError` variant. None of them affect other requests in flight.

use crate::ports::outbound::TransportError;
use shared_types::Node;
use std::time::Duration;
use thiserror::Error;

/// Waiter registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A waiter is already registered under this id.
    #[error("a response waiter is already registered for id {0}")]
    DuplicateId(String),

    /// The registry was drained at session teardown.
    #[error("waiter registry is closed")]
    Closed,
}

/// Outcome of a query other than success.
#[derive(Debug, Error)]
pub enum IqError {
    /// The transport refused the outbound envelope. No waiter is left behind.
    #[error("failed to send query: {0}")]
    SendFailed(#[source] TransportError),

    /// The response tag or type is outside the expected set.
    #[error("unexpected response to query (tag={tag} type={iq_type})")]
    UnexpectedResponse {
        tag: String,
        iq_type: String,
        response: Box<Node>,
    },

    /// The peer answered with `type="error"`.
    #[error("query returned an error response: {rendered}")]
    ErrorResponse {
        /// `code` of the `<error/>` child, if present.
        code: Option<i64>,
        /// `text` of the `<error/>` child, if present.
        text: Option<String>,
        /// The full response rendered as XML.
        rendered: String,
        response: Box<Node>,
    },

    /// The caller's cancellation token fired before a response arrived.
    #[error("query canceled")]
    Canceled,

    /// No response within the bounded wait.
    #[error("query timed out after {0:?}")]
    TimedOut(Duration),

    /// The session was torn down before a response arrived.
    #[error("session disconnected before a response arrived")]
    Disconnected,

    /// The waiter could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IqError {
    /// The response node attached to this error, if any.
    pub fn response(&self) -> Option<&Node> {
        match self {
            IqError::UnexpectedResponse { response, .. }
            | IqError::ErrorResponse { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            IqError::SendFailed(_) => "send_failed",
            IqError::UnexpectedResponse { .. } => "unexpected_response",
            IqError::ErrorResponse { .. } => "error_response",
            IqError::Canceled => "canceled",
            IqError::TimedOut(_) => "timed_out",
            IqError::Disconnected => "disconnected",
            IqError::Registry(_) => "registry",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, IqError::TimedOut(_))
    }
}
