//! # Shared Types Crate
//!
//! This crate contains the message model exchanged over a session: the
//! [`Node`], its typed attributes, its content and the [`Jid`] address type.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every crate in the workspace speaks `Node`.
//! - **Typed Access**: attributes are heterogeneous; readers go through typed
//!   accessors that return `Option` instead of casting blindly.
//! - **Opaque Content**: payloads are carried, rendered for diagnostics, and
//!   never interpreted here.

pub mod errors;
pub mod jid;
pub mod node;
pub mod render;

pub use errors::*;
pub use jid::Jid;
pub use node::{AttrValue, Attrs, Node, NodeContent};

/// Tag of the query envelope, used for both requests and responses.
pub const IQ_TAG: &str = "iq";

/// Attribute names of the query envelope.
pub mod attrs {
    /// Correlation identifier.
    pub const ID: &str = "id";
    /// Request namespace.
    pub const XMLNS: &str = "xmlns";
    /// Envelope type (`get`, `set`, `result`, `error`).
    pub const TYPE: &str = "type";
    /// Target address.
    pub const TO: &str = "to";
    /// Sender address (set by the peer on responses).
    pub const FROM: &str = "from";
}
