//! `shared-bus` link endpoints as the session transport.

use crate::ports::inbound::NodeReceiver;
use crate::ports::outbound::{NodeSender, TransportError};
use async_trait::async_trait;
use shared_bus::{LinkEndpoint, LinkError};
use shared_types::Node;

impl From<LinkError> for TransportError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::Closed => TransportError::NotConnected,
            LinkError::PeerGone => TransportError::ChannelClosed,
        }
    }
}

#[async_trait]
impl NodeSender for LinkEndpoint {
    async fn send_node(&self, node: Node) -> Result<(), TransportError> {
        self.send(node).await.map_err(Into::into)
    }
}

#[async_trait]
impl NodeReceiver for LinkEndpoint {
    async fn receive_node(&self) -> Result<Node, TransportError> {
        self.recv().await.map_err(Into::into)
    }
}
