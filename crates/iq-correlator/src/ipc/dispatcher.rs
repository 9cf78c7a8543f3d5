//! Async dispatcher: register a waiter, send the envelope, roll back on
//! failure. Never waits for the response itself.

use crate::domain::correlation::RequestIdGenerator;
use crate::domain::error::{IqError, RegistryError};
use crate::domain::pending::{ResponseWaiter, WaiterRegistry};
use crate::domain::query::InfoQuery;
use crate::ports::outbound::NodeSender;
use std::sync::Arc;
use tracing::{debug, warn};

/// A query that has been sent and is waiting for its response.
#[derive(Debug)]
pub struct PendingIq {
    /// Correlation id carried by the envelope.
    pub id: String,
    /// Consuming end of the response slot.
    pub waiter: ResponseWaiter,
}

/// Builds and sends query envelopes on behalf of one session.
pub struct IqDispatcher {
    ids: Arc<RequestIdGenerator>,
    registry: WaiterRegistry,
    sender: Arc<dyn NodeSender>,
}

impl IqDispatcher {
    pub fn new(
        ids: Arc<RequestIdGenerator>,
        registry: WaiterRegistry,
        sender: Arc<dyn NodeSender>,
    ) -> Self {
        Self {
            ids,
            registry,
            sender,
        }
    }

    /// Register a waiter and send the query envelope.
    ///
    /// On send failure the waiter is canceled before returning, so exactly
    /// one registry entry exists per successful dispatch and none otherwise.
    pub async fn dispatch(&self, query: &InfoQuery) -> Result<PendingIq, IqError> {
        let id = match &query.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => self.ids.next_id(),
        };

        let waiter = self.registry.register(&id).map_err(|e| match e {
            RegistryError::Closed => IqError::Disconnected,
            other => IqError::Registry(other),
        })?;

        let node = query.to_node(&id);
        if let Err(e) = self.sender.send_node(node).await {
            self.registry.cancel(&id);
            warn!(
                correlation_id = %id,
                namespace = %query.namespace,
                error = %e,
                "Failed to send query"
            );
            return Err(IqError::SendFailed(e));
        }

        debug!(
            correlation_id = %id,
            namespace = %query.namespace,
            iq_type = %query.iq_type,
            to = %query.to,
            "Sent query"
        );

        Ok(PendingIq { id, waiter })
    }

    /// The registry this dispatcher registers into.
    pub fn registry(&self) -> &WaiterRegistry {
        &self.registry
    }

    /// The session id generator.
    pub fn ids(&self) -> &RequestIdGenerator {
        &self.ids
    }
}
