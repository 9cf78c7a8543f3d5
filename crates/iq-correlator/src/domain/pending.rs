//! Waiter Registry - maps correlation IDs to one-shot response slots.
//!
//! Flow:
//! 1. Dispatcher calls `register()` and keeps the returned `ResponseWaiter`
//! 2. Dispatcher sends the query envelope carrying the id
//! 3. The inbound path calls `deliver()` when a response with that id arrives
//! 4. The caller awaits the waiter, racing it against timeout and cancellation
//!
//! All three mutating operations run under one mutex and do no I/O while
//! holding it. `deliver` and `cancel` both remove the entry first, so
//! whichever acquires the lock first wins and the other sees "absent".

use crate::domain::error::RegistryError;
use parking_lot::Mutex;
use pin_project_lite::pin_project;
use shared_types::Node;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::debug;

/// What a waiter observes when it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaiterSignal {
    /// A correlated response.
    Response(Node),
    /// The entry was canceled before any response.
    Canceled,
    /// The registry was drained at session teardown.
    Disconnected,
}

/// Value carried through the slot. Cancellation drops the sender instead.
#[derive(Debug)]
enum Resolution {
    Response(Node),
    Disconnected,
}

/// A pending request waiting for its response.
struct PendingEntry {
    /// Registration sequence, so a stale waiter never cancels a newer entry
    /// that reuses an explicit id.
    seq: u64,
    sender: oneshot::Sender<Resolution>,
    registered_at: Instant,
}

struct RegistryState {
    waiters: HashMap<String, PendingEntry>,
    closed: bool,
    next_seq: u64,
}

/// Statistics for the waiter registry.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total waiters registered
    pub total_registered: AtomicU64,
    /// Total responses delivered to a waiter
    pub total_delivered: AtomicU64,
    /// Total waiters canceled (send failure, cancellation, timeout, drop)
    pub total_canceled: AtomicU64,
    /// Total waits that ended by timeout
    pub total_timeouts: AtomicU64,
    /// Total waiters released by a drain
    pub total_drained: AtomicU64,
    /// Total deliveries for unknown or already-resolved ids
    pub total_unmatched: AtomicU64,
}

/// Point-in-time copy of [`PendingStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingStatsSnapshot {
    pub registered: u64,
    pub delivered: u64,
    pub canceled: u64,
    pub timeouts: u64,
    pub drained: u64,
    pub unmatched: u64,
    pub pending: usize,
}

struct Inner {
    state: Mutex<RegistryState>,
    stats: PendingStats,
}

impl Inner {
    fn remove_if(&self, id: &str, seq: Option<u64>) -> Option<PendingEntry> {
        let mut state = self.state.lock();
        match state.waiters.get(id) {
            Some(entry) if seq.map_or(true, |s| s == entry.seq) => state.waiters.remove(id),
            _ => None,
        }
    }

    fn cancel(&self, id: &str, seq: Option<u64>) -> bool {
        // Dropping the entry (and its sender) outside the lock closes the slot.
        match self.remove_if(id, seq) {
            Some(entry) => {
                self.stats.total_canceled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %id,
                    waited_ms = entry.registered_at.elapsed().as_millis() as u64,
                    "Canceled response waiter"
                );
                true
            }
            None => false,
        }
    }
}

/// Session-scoped registry of response waiters.
///
/// Cloning is cheap and yields a handle to the same registry.
#[derive(Clone)]
pub struct WaiterRegistry {
    inner: Arc<Inner>,
}

impl WaiterRegistry {
    /// Create an empty, open registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RegistryState {
                    waiters: HashMap::new(),
                    closed: false,
                    next_seq: 0,
                }),
                stats: PendingStats::default(),
            }),
        }
    }

    /// Register a waiter for `id` and return the consuming end of its slot.
    ///
    /// Fails if `id` is already pending or the registry has been drained.
    pub fn register(&self, id: &str) -> Result<ResponseWaiter, RegistryError> {
        let (tx, rx) = oneshot::channel();
        let seq = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return Err(RegistryError::Closed);
            }
            if state.waiters.contains_key(id) {
                return Err(RegistryError::DuplicateId(id.to_string()));
            }
            state.next_seq += 1;
            let seq = state.next_seq;
            state.waiters.insert(
                id.to_string(),
                PendingEntry {
                    seq,
                    sender: tx,
                    registered_at: Instant::now(),
                },
            );
            seq
        };

        self.inner
            .stats
            .total_registered
            .fetch_add(1, Ordering::Relaxed);
        debug!(correlation_id = %id, "Registered response waiter");

        Ok(ResponseWaiter {
            rx,
            id: id.to_string(),
            seq,
            registry: Arc::clone(&self.inner),
            resolved: false,
        })
    }

    /// Hand `node` to the waiter registered under `id`.
    ///
    /// Returns `false` for unknown or already-resolved ids, which is not an
    /// error. Never blocks: the slot buffers exactly one value.
    pub fn deliver(&self, id: &str, node: Node) -> bool {
        let Some(entry) = self.inner.remove_if(id, None) else {
            self.inner
                .stats
                .total_unmatched
                .fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %id, "No waiter for response id");
            return false;
        };

        let response_time = entry.registered_at.elapsed();
        self.inner
            .stats
            .total_delivered
            .fetch_add(1, Ordering::Relaxed);
        if entry.sender.send(Resolution::Response(node)).is_err() {
            debug!(correlation_id = %id, "Response waiter dropped before delivery");
        } else {
            debug!(
                correlation_id = %id,
                response_time_ms = response_time.as_millis() as u64,
                "Delivered response"
            );
        }
        true
    }

    /// Remove the waiter for `id`, closing its slot so a blocked consumer
    /// observes [`WaiterSignal::Canceled`]. No-op if already removed.
    pub fn cancel(&self, id: &str) -> bool {
        self.inner.cancel(id, None)
    }

    /// Close the registry and release every pending waiter with
    /// [`WaiterSignal::Disconnected`]. Later registrations fail with
    /// [`RegistryError::Closed`].
    ///
    /// Returns the number of waiters released.
    pub fn drain(&self) -> usize {
        let drained: Vec<(String, PendingEntry)> = {
            let mut state = self.inner.state.lock();
            state.closed = true;
            state.waiters.drain().collect()
        };

        let count = drained.len();
        for (id, entry) in drained {
            // The waiter may already be gone; nothing to notify then.
            let _ = entry.sender.send(Resolution::Disconnected);
            debug!(correlation_id = %id, "Released waiter on drain");
        }
        self.inner
            .stats
            .total_drained
            .fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Whether a waiter is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.state.lock().waiters.contains_key(id)
    }

    /// Number of pending waiters.
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().waiters.len()
    }

    /// Whether [`drain`](Self::drain) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Live counters.
    pub fn stats(&self) -> &PendingStats {
        &self.inner.stats
    }

    /// Counters plus the current pending count.
    pub fn snapshot(&self) -> PendingStatsSnapshot {
        let stats = &self.inner.stats;
        PendingStatsSnapshot {
            registered: stats.total_registered.load(Ordering::Relaxed),
            delivered: stats.total_delivered.load(Ordering::Relaxed),
            canceled: stats.total_canceled.load(Ordering::Relaxed),
            timeouts: stats.total_timeouts.load(Ordering::Relaxed),
            drained: stats.total_drained.load(Ordering::Relaxed),
            unmatched: stats.total_unmatched.load(Ordering::Relaxed),
            pending: self.pending_count(),
        }
    }

    pub(crate) fn record_timeout(&self) {
        self.inner
            .stats
            .total_timeouts
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for WaiterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pin_project! {
    /// Consuming end of a waiter slot.
    ///
    /// Resolves to a [`WaiterSignal`]. Dropping it before it resolves removes
    /// its registry entry.
    pub struct ResponseWaiter {
        #[pin]
        rx: oneshot::Receiver<Resolution>,
        id: String,
        seq: u64,
        registry: Arc<Inner>,
        resolved: bool,
    }

    impl PinnedDrop for ResponseWaiter {
        fn drop(this: Pin<&mut Self>) {
            let this = this.project();
            if !*this.resolved {
                this.registry.cancel(this.id, Some(*this.seq));
            }
        }
    }
}

impl ResponseWaiter {
    /// Correlation id this waiter is registered under.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Future for ResponseWaiter {
    type Output = WaiterSignal;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let signal = match this.rx.poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(Resolution::Response(node))) => WaiterSignal::Response(node),
            Poll::Ready(Ok(Resolution::Disconnected)) => WaiterSignal::Disconnected,
            Poll::Ready(Err(_)) => WaiterSignal::Canceled,
        };
        *this.resolved = true;
        Poll::Ready(signal)
    }
}

impl std::fmt::Debug for ResponseWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWaiter")
            .field("id", &self.id)
            .field("resolved", &self.resolved)
            .finish()
    }
}
