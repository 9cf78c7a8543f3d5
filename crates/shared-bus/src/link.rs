//! # Link Endpoints
//!
//! Two endpoints joined by a pair of bounded `tokio::sync::mpsc` channels.

use parking_lot::Mutex;
use shared_types::Node;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Errors from link operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// This endpoint was closed locally.
    #[error("link closed locally")]
    Closed,

    /// The other endpoint went away.
    #[error("peer disconnected")]
    PeerGone,
}

/// Frame counters for one endpoint.
#[derive(Debug, Default)]
pub struct LinkStats {
    /// Frames written to the peer.
    pub frames_sent: AtomicU64,
    /// Frames read from the peer.
    pub frames_received: AtomicU64,
}

/// One side of a [`memory_link`].
pub struct LinkEndpoint {
    /// Name used in logs.
    name: &'static str,

    /// Outbound half. `None` once closed.
    outbound: Mutex<Option<mpsc::Sender<Node>>>,

    /// Inbound half. Async mutex so a single reader can hold it across `recv`.
    inbound: tokio::sync::Mutex<mpsc::Receiver<Node>>,

    stats: Arc<LinkStats>,
}

/// Create a connected pair of endpoints, each buffering `buffer` frames per
/// direction.
#[must_use]
pub fn memory_link(buffer: usize) -> (LinkEndpoint, LinkEndpoint) {
    let (a_tx, b_rx) = mpsc::channel(buffer.max(1));
    let (b_tx, a_rx) = mpsc::channel(buffer.max(1));
    (
        LinkEndpoint::new("client", a_tx, a_rx),
        LinkEndpoint::new("peer", b_tx, b_rx),
    )
}

impl LinkEndpoint {
    fn new(name: &'static str, tx: mpsc::Sender<Node>, rx: mpsc::Receiver<Node>) -> Self {
        Self {
            name,
            outbound: Mutex::new(Some(tx)),
            inbound: tokio::sync::Mutex::new(rx),
            stats: Arc::new(LinkStats::default()),
        }
    }

    /// Send one frame to the peer. Waits only while the peer's buffer is full.
    pub async fn send(&self, node: Node) -> Result<(), LinkError> {
        let tx = self.outbound.lock().clone().ok_or(LinkError::Closed)?;
        tx.send(node).await.map_err(|_| LinkError::PeerGone)?;
        self.stats.frames_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Receive the next frame from the peer.
    ///
    /// Returns `LinkError::PeerGone` once the peer is closed and every
    /// buffered frame has been read.
    pub async fn recv(&self) -> Result<Node, LinkError> {
        let mut rx = self.inbound.lock().await;
        match rx.recv().await {
            Some(node) => {
                self.stats.frames_received.fetch_add(1, Ordering::Relaxed);
                Ok(node)
            }
            None => Err(LinkError::PeerGone),
        }
    }

    /// Close the outbound half. Idempotent.
    pub fn close(&self) {
        if self.outbound.lock().take().is_some() {
            debug!(endpoint = self.name, "Link endpoint closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.outbound.lock().is_none()
    }

    /// Endpoint name (`client` or `peer`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Frame counters.
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }
}
