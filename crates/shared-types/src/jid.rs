//! JID addressing (`user@server`).

use crate::errors::JidError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Jabber-style address: an optional user part and a server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Jid {
    pub user: String,
    pub server: String,
}

impl Jid {
    /// Create a JID from a user and a server.
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            server: server.into(),
        }
    }

    /// Create a server-only JID.
    pub fn server(server: impl Into<String>) -> Self {
        Self {
            user: String::new(),
            server: server.into(),
        }
    }

    /// Whether this JID has no server (the zero value).
    pub fn is_empty(&self) -> bool {
        self.server.is_empty()
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user.is_empty() {
            write!(f, "{}", self.server)
        } else {
            write!(f, "{}@{}", self.user, self.server)
        }
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(JidError::Empty);
        }
        let mut parts = s.split('@');
        let first = parts.next().unwrap_or_default();
        match (parts.next(), parts.next()) {
            (None, _) => Ok(Jid::server(first)),
            (Some(server), None) if !server.is_empty() => Ok(Jid::new(first, server)),
            (Some(_), None) => Err(JidError::MissingServer(s.to_string())),
            (Some(_), Some(_)) => Err(JidError::TooManySeparators(s.to_string())),
        }
    }
}
