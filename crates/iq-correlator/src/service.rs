//! Session facade - the entry point a connection owner holds.
//!
//! Wires the id generator, waiter registry, dispatcher and bounded-wait
//! handler for one connection and exposes the inbound correlator the read
//! loop feeds.

use crate::domain::config::{ConfigError, CorrelatorConfig};
use crate::domain::correlation::RequestIdGenerator;
use crate::domain::error::IqError;
use crate::domain::pending::{PendingStatsSnapshot, WaiterRegistry};
use crate::domain::query::InfoQuery;
use crate::ipc::dispatcher::{IqDispatcher, PendingIq};
use crate::ipc::handler::IqHandler;
use crate::ipc::inbound::{HandlerChain, InboundCorrelator, InboundListener};
use crate::ports::inbound::NodeReceiver;
use crate::ports::outbound::NodeSender;
use shared_types::Node;
use std::sync::Arc;
use tracing::info;

/// Query correlation for one live connection.
pub struct IqSession {
    config: CorrelatorConfig,
    ids: Arc<RequestIdGenerator>,
    registry: WaiterRegistry,
    handler: IqHandler,
}

impl IqSession {
    /// Create a session sending through `sender`.
    pub fn new(config: CorrelatorConfig, sender: Arc<dyn NodeSender>) -> Result<Self, ConfigError> {
        config.validate()?;

        let ids = Arc::new(match &config.id_prefix {
            Some(prefix) => RequestIdGenerator::new(prefix.clone()),
            None => RequestIdGenerator::random(),
        });
        let registry = WaiterRegistry::new();
        let dispatcher = IqDispatcher::new(Arc::clone(&ids), registry.clone(), sender);
        let handler = IqHandler::new(dispatcher, config.default_timeout());

        info!(
            id_prefix = ids.prefix(),
            default_timeout_ms = config.default_timeout_ms,
            "Query session created"
        );

        Ok(Self {
            config,
            ids,
            registry,
            handler,
        })
    }

    /// Send a query and wait for its response.
    pub async fn query(&self, query: InfoQuery) -> Result<Node, IqError> {
        self.handler.query(query).await
    }

    /// Send a query and return its id and waiter without waiting.
    pub async fn query_async(&self, query: &InfoQuery) -> Result<PendingIq, IqError> {
        self.handler.query_async(query).await
    }

    /// Next id from this session's generator.
    pub fn generate_request_id(&self) -> String {
        self.ids.next_id()
    }

    /// Inbound handler that routes responses to this session's waiters.
    pub fn correlator(&self) -> InboundCorrelator {
        InboundCorrelator::new(self.registry.clone())
    }

    /// Read loop over `receiver` with the correlator first in the chain.
    pub fn listener(&self, receiver: Arc<dyn NodeReceiver>) -> InboundListener {
        let chain = HandlerChain::new().with(self.correlator());
        InboundListener::new(receiver, chain, self.registry.clone())
    }

    pub fn registry(&self) -> &WaiterRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    pub fn id_prefix(&self) -> &str {
        self.ids.prefix()
    }

    pub fn pending_count(&self) -> usize {
        self.registry.pending_count()
    }

    pub fn stats(&self) -> PendingStatsSnapshot {
        self.registry.snapshot()
    }

    /// Tear down: every in-flight query resolves with `Disconnected` and
    /// later queries fail the same way. Returns the number released.
    pub fn close(&self) -> usize {
        let released = self.registry.drain();
        info!(released, "Query session closed");
        released
    }

    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }
}
