//! Correlation ID generation.
//!
//! IDs are a session prefix followed by a decimal counter, e.g. `"42.17-1"`,
//! `"42.17-2"`. The prefix is fixed when the session starts and differs
//! between connection instances; the counter is never reset, so an id is
//! never reused within a session.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates unique request identifiers for one session.
#[derive(Debug)]
pub struct RequestIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl RequestIdGenerator {
    /// Create a generator with an explicit session prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Create a generator with a random prefix of the form `"{b0}.{b1}-"`.
    pub fn random() -> Self {
        let bytes: [u8; 2] = rand::thread_rng().gen();
        Self::new(format!("{}.{}-", bytes[0], bytes[1]))
    }

    /// Next identifier. Each call observes a distinct counter value.
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }

    /// The session prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
