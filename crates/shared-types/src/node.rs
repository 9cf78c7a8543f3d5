//! # Node
//!
//! The wire-level unit: a tag, a map of heterogeneous attributes and an
//! opaque content payload.
//!
//! Attribute values are read through typed accessors (`attr_str`,
//! `attr_i64`, `attr_jid`, `attr_bool`) that return `None` when the key is
//! absent or the value has another type.

use crate::errors::AttrError;
use crate::jid::Jid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    String(String),
    Jid(Jid),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    /// Name of the held type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::String(_) => "string",
            AttrValue::Jid(_) => "jid",
            AttrValue::Int(_) => "int",
            AttrValue::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(s) => f.write_str(s),
            AttrValue::Jid(jid) => write!(f, "{jid}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<Jid> for AttrValue {
    fn from(value: Jid) -> Self {
        AttrValue::Jid(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Attribute map. Ordered so that rendering is deterministic.
pub type Attrs = BTreeMap<String, AttrValue>;

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeContent {
    #[default]
    None,
    Nodes(Vec<Node>),
    Bytes(Vec<u8>),
}

impl NodeContent {
    pub fn is_none(&self) -> bool {
        matches!(self, NodeContent::None)
    }
}

impl From<Vec<Node>> for NodeContent {
    fn from(nodes: Vec<Node>) -> Self {
        NodeContent::Nodes(nodes)
    }
}

impl From<Vec<u8>> for NodeContent {
    fn from(bytes: Vec<u8>) -> Self {
        NodeContent::Bytes(bytes)
    }
}

impl From<Node> for NodeContent {
    fn from(node: Node) -> Self {
        NodeContent::Nodes(vec![node])
    }
}

/// A tagged, attribute-bearing message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    pub attrs: Attrs,
    pub content: NodeContent,
}

impl Node {
    /// Create a node with no attributes and no content.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            content: NodeContent::None,
        }
    }

    /// Builder-style method to set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Builder-style method to set the content.
    pub fn with_content(mut self, content: impl Into<NodeContent>) -> Self {
        self.content = content.into();
        self
    }

    /// Raw attribute lookup.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// String attribute. `None` if absent or not string-typed.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        match self.attrs.get(key)? {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer attribute. Accepts integer values and decimal strings.
    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        match self.attrs.get(key)? {
            AttrValue::Int(i) => Some(*i),
            AttrValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// JID attribute. Accepts JID values and parseable strings.
    pub fn attr_jid(&self, key: &str) -> Option<Jid> {
        match self.attrs.get(key)? {
            AttrValue::Jid(jid) => Some(jid.clone()),
            AttrValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Boolean attribute. Accepts booleans and `"true"`/`"false"`.
    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        match self.attrs.get(key)? {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// String attribute that must be present.
    pub fn require_str(&self, key: &str) -> Result<&str, AttrError> {
        match self.attrs.get(key) {
            Some(AttrValue::String(s)) => Ok(s),
            Some(_) => Err(AttrError::WrongType {
                tag: self.tag.clone(),
                key: key.to_string(),
                expected: "string",
            }),
            None => Err(AttrError::Missing {
                tag: self.tag.clone(),
                key: key.to_string(),
            }),
        }
    }

    /// Child nodes. Empty when the content is not a node list.
    pub fn children(&self) -> &[Node] {
        match &self.content {
            NodeContent::Nodes(nodes) => nodes,
            _ => &[],
        }
    }

    /// First child with the given tag.
    pub fn child_by_tag(&self, tag: &str) -> Option<&Node> {
        self.children().iter().find(|child| child.tag == tag)
    }

    /// Binary content, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}
