//! Query envelope types.

use serde::{Deserialize, Serialize};
use shared_types::{attrs, Jid, Node, NodeContent, IQ_TAG};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The `type` attribute of a query envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IqType {
    Get,
    Set,
    Result,
    Error,
}

impl IqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IqType::Get => "get",
            IqType::Set => "set",
            IqType::Result => "result",
            IqType::Error => "error",
        }
    }

    /// Whether this type is valid on a response.
    pub fn is_response(&self) -> bool {
        matches!(self, IqType::Result | IqType::Error)
    }
}

impl fmt::Display for IqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IqType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(IqType::Get),
            "set" => Ok(IqType::Set),
            "result" => Ok(IqType::Result),
            "error" => Ok(IqType::Error),
            other => Err(format!("unknown iq type: {other}")),
        }
    }
}

/// One outbound query.
///
/// `id`, `timeout` and `cancellation` are optional: an id is generated when
/// missing, the session default timeout applies when unset, and a query
/// without a token can only end by response, timeout or teardown.
#[derive(Debug, Clone)]
pub struct InfoQuery {
    pub namespace: String,
    pub iq_type: IqType,
    pub to: Jid,
    pub id: Option<String>,
    pub content: NodeContent,
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl InfoQuery {
    pub fn new(namespace: impl Into<String>, iq_type: IqType, to: Jid) -> Self {
        Self {
            namespace: namespace.into(),
            iq_type,
            to,
            id: None,
            content: NodeContent::None,
            timeout: None,
            cancellation: None,
        }
    }

    /// A `get` query.
    pub fn get(namespace: impl Into<String>, to: Jid) -> Self {
        Self::new(namespace, IqType::Get, to)
    }

    /// A `set` query.
    pub fn set(namespace: impl Into<String>, to: Jid) -> Self {
        Self::new(namespace, IqType::Set, to)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<NodeContent>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the outbound envelope `<iq id xmlns type to>content</iq>`.
    pub fn to_node(&self, id: &str) -> Node {
        Node::new(IQ_TAG)
            .with_attr(attrs::ID, id)
            .with_attr(attrs::XMLNS, self.namespace.as_str())
            .with_attr(attrs::TYPE, self.iq_type.as_str())
            .with_attr(attrs::TO, self.to.clone())
            .with_content(self.content.clone())
    }
}
