//! # Error Types
//!
//! Defines error types for the message model.

use thiserror::Error;

/// Errors from parsing a JID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    /// The input was empty.
    #[error("empty JID")]
    Empty,

    /// The input had a user part but no server.
    #[error("missing server in JID: {0}")]
    MissingServer(String),

    /// More than one `@` separator.
    #[error("too many '@' separators in JID: {0}")]
    TooManySeparators(String),
}

/// Errors from reading a required attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrError {
    /// The attribute is not present on the node.
    #[error("missing attribute '{key}' on <{tag}>")]
    Missing { tag: String, key: String },

    /// The attribute is present but holds a different type.
    #[error("attribute '{key}' on <{tag}> is not a {expected}")]
    WrongType {
        tag: String,
        key: String,
        expected: &'static str,
    },
}
