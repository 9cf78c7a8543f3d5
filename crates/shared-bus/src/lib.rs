//! # Shared Bus - In-Memory Node Link
//!
//! A bounded, bidirectional pipe of [`Node`](shared_types::Node)s that stands
//! in for a live, multiplexed session connection.
//!
//! ```text
//! ┌──────────────┐   send() ──────────────▶   ┌──────────────┐
//! │ LinkEndpoint │                            │ LinkEndpoint │
//! │   (client)   │   ◀────────────── send()   │    (peer)    │
//! └──────────────┘                            └──────────────┘
//! ```
//!
//! Each endpoint sends to the other and reads what the other sent. Closing
//! an endpoint ends the peer's read side once in-flight frames are drained.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod link;

pub use link::{memory_link, LinkEndpoint, LinkError, LinkStats};

/// Frames buffered per direction before `send` waits.
pub const DEFAULT_LINK_BUFFER: usize = 256;
