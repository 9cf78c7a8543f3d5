//! Inbound ports (Driving Ports)
//!
//! The read side of the session: a source of decoded nodes and the handlers
//! those nodes are offered to.

use crate::ports::outbound::TransportError;
use async_trait::async_trait;
use shared_types::Node;

/// Source of decoded inbound nodes.
#[async_trait]
pub trait NodeReceiver: Send + Sync {
    /// Receive the next node (waits until one is available).
    ///
    /// Returns `TransportError::ChannelClosed` when the connection is gone.
    async fn receive_node(&self) -> Result<Node, TransportError>;
}

/// A handler in the inbound dispatch chain.
///
/// Returns `true` when it consumed the node, `false` to let the next handler
/// try. Handlers must not block.
pub trait InboundHandler: Send + Sync {
    fn handle_node(&self, node: &Node) -> bool;
}

impl<F> InboundHandler for F
where
    F: Fn(&Node) -> bool + Send + Sync,
{
    fn handle_node(&self, node: &Node) -> bool {
        self(node)
    }
}
