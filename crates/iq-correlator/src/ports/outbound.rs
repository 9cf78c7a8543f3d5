//! Outbound ports (Driven Ports)
//!
//! What the correlator needs from the session transport.

use async_trait::async_trait;
use shared_types::Node;
use thiserror::Error;

/// Transport error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Framed, atomic send of one node over the live connection.
#[async_trait]
pub trait NodeSender: Send + Sync {
    async fn send_node(&self, node: Node) -> Result<(), TransportError>;
}
