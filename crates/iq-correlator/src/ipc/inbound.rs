//! Inbound side: route response envelopes to their waiters and run the
//! session read loop.

use crate::domain::pending::WaiterRegistry;
use crate::ports::inbound::{InboundHandler, NodeReceiver};
use crate::ports::outbound::TransportError;
use shared_types::{attrs, Node, IQ_TAG};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Offers inbound nodes to the waiter registry.
#[derive(Clone)]
pub struct InboundCorrelator {
    registry: WaiterRegistry,
}

impl InboundCorrelator {
    pub fn new(registry: WaiterRegistry) -> Self {
        Self { registry }
    }

    /// Deliver `node` to the waiter registered under its `id`.
    ///
    /// Returns `false` (node left for other handlers) when it is not a query
    /// envelope, carries no string `id`, or no waiter matches.
    pub fn receive_response(&self, node: &Node) -> bool {
        if node.tag != IQ_TAG {
            return false;
        }
        let Some(id) = node.attr_str(attrs::ID) else {
            return false;
        };
        self.registry.deliver(id, node.clone())
    }
}

impl InboundHandler for InboundCorrelator {
    fn handle_node(&self, node: &Node) -> bool {
        self.receive_response(node)
    }
}

/// Ordered list of inbound handlers. The first one to return `true` wins.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn InboundHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, handler: impl InboundHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn push(&mut self, handler: Arc<dyn InboundHandler>) {
        self.handlers.push(handler);
    }

    /// Offer `node` to each handler in order.
    pub fn dispatch(&self, node: &Node) -> bool {
        self.handlers.iter().any(|h| h.handle_node(node))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Counters reported when a listener exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerSummary {
    pub received: u64,
    pub unhandled: u64,
    /// Waiters released by the drain on disconnect.
    pub drained: usize,
}

/// Session read loop: receive nodes, offer them to the chain, drain the
/// registry when the connection goes away.
pub struct InboundListener {
    receiver: Arc<dyn NodeReceiver>,
    chain: HandlerChain,
    registry: WaiterRegistry,
}

impl InboundListener {
    pub fn new(receiver: Arc<dyn NodeReceiver>, chain: HandlerChain, registry: WaiterRegistry) -> Self {
        Self {
            receiver,
            chain,
            registry,
        }
    }

    /// Append a handler behind the ones already in the chain.
    #[must_use]
    pub fn with_handler(mut self, handler: impl InboundHandler + 'static) -> Self {
        self.chain = self.chain.with(handler);
        self
    }

    /// Run until the connection closes or `shutdown` fires.
    ///
    /// A closed connection drains the registry so every waiter observes
    /// `Disconnected`. A shutdown leaves the registry to its owner.
    pub async fn run(self, shutdown: CancellationToken) -> ListenerSummary {
        let mut summary = ListenerSummary::default();
        info!(handlers = self.chain.len(), "Inbound listener started");

        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Inbound listener shutting down");
                    break;
                }
                received = self.receiver.receive_node() => received,
            };

            match received {
                Ok(node) => {
                    summary.received += 1;
                    if !self.chain.dispatch(&node) {
                        summary.unhandled += 1;
                        debug!(
                            tag = %node.tag,
                            id = node.attr_str(attrs::ID).unwrap_or_default(),
                            "Unhandled inbound node"
                        );
                    }
                }
                Err(TransportError::ChannelClosed) | Err(TransportError::NotConnected) => {
                    summary.drained = self.registry.drain();
                    warn!(
                        drained = summary.drained,
                        "Connection closed, pending queries disconnected"
                    );
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to receive inbound node");
                }
            }
        }

        summary
    }
}
