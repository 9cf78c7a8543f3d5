//! Loopback peer: the far end of the link, answering queries.

use crate::config::PeerConfig;
use shared_bus::{LinkEndpoint, LinkError};
use shared_types::{attrs, Node, NodeContent, IQ_TAG};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answers `get`/`set` queries arriving on its endpoint.
///
/// - namespace `deny_namespace`: `type="error"` with an `<error/>` child
/// - namespace `silent_namespace`: no answer
/// - anything else: `type="result"` echoing the query content
pub struct LoopbackPeer {
    endpoint: LinkEndpoint,
    config: PeerConfig,
}

impl LoopbackPeer {
    pub fn new(endpoint: LinkEndpoint, config: PeerConfig) -> Self {
        Self { endpoint, config }
    }

    /// Serve until the client goes away. Returns the number of answers sent.
    pub async fn run(self) -> u64 {
        let delay = Duration::from_millis(self.config.response_delay_ms);
        let mut answered = 0;
        info!(endpoint = self.endpoint.name(), "Loopback peer started");

        loop {
            let query = match self.endpoint.recv().await {
                Ok(node) => node,
                Err(LinkError::PeerGone) | Err(LinkError::Closed) => break,
            };

            let Some(reply) = self.answer(&query) else {
                debug!(tag = %query.tag, id = query.attr_str(attrs::ID).unwrap_or_default(), "Not answering");
                continue;
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = self.endpoint.send(reply).await {
                warn!(error = %e, "Loopback peer failed to answer");
                break;
            }
            answered += 1;
        }

        self.endpoint.close();
        info!(answered, "Loopback peer stopped");
        answered
    }

    /// Build the reply for `query`, if it gets one.
    pub fn answer(&self, query: &Node) -> Option<Node> {
        if query.tag != IQ_TAG {
            return None;
        }
        let id = query.attr_str(attrs::ID)?;
        match query.attr_str(attrs::TYPE) {
            Some("get") | Some("set") => {}
            _ => return None,
        }
        let namespace = query.attr_str(attrs::XMLNS).unwrap_or_default();
        if namespace == self.config.silent_namespace {
            return None;
        }

        let mut reply = Node::new(IQ_TAG).with_attr(attrs::ID, id);
        if let Some(to) = query.attr(attrs::TO) {
            reply = reply.with_attr(attrs::FROM, to.clone());
        }

        if namespace == self.config.deny_namespace {
            let error = Node::new("error")
                .with_attr("code", 403i64)
                .with_attr("text", "forbidden");
            Some(
                reply
                    .with_attr(attrs::TYPE, "error")
                    .with_content(NodeContent::Nodes(vec![error])),
            )
        } else {
            Some(
                reply
                    .with_attr(attrs::TYPE, "result")
                    .with_content(query.content.clone()),
            )
        }
    }
}
