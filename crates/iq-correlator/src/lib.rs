//! # IQ Correlator
//!
//! Request/response correlation for query envelopes over one multiplexed,
//! ordered node connection.
//!
//! ## Architecture
//!
//! ```text
//! caller ──query()──► IqHandler ──► IqDispatcher ──register──► WaiterRegistry
//!                        │               │                        ▲
//!                        │               └──send_node──► NodeSender (link)
//!                        │                                        │
//!                        └── select!(waiter, cancel, timeout)     │
//!                                                                 │
//! NodeReceiver (link) ──► InboundListener ──► HandlerChain ──► InboundCorrelator
//!                                                   │            (deliver by id)
//!                                                   └──► other handlers
//! ```
//!
//! ## Guarantees
//!
//! - Every generated id is unique within a session.
//! - A waiter resolves at most once: first response, cancellation, timeout or
//!   disconnect wins and the rest are no-ops.
//! - Every waiter is released from the registry however its query ends,
//!   including when the caller drops the future.
//! - Responses for unknown or already-resolved ids fall through to the next
//!   inbound handler.
//!
//! ## Usage
//!
//! ```ignore
//! use iq_correlator::{CorrelatorConfig, InfoQuery, IqSession};
//!
//! let session = IqSession::new(CorrelatorConfig::from_env(), sender)?;
//! tokio::spawn(session.listener(receiver).run(shutdown.clone()));
//! let response = session.query(InfoQuery::get("test", to)).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

pub use domain::{
    ConfigError, CorrelatorConfig, InfoQuery, IqError, IqType, PendingStats,
    PendingStatsSnapshot, RegistryError, RequestIdGenerator, ResponseWaiter, WaiterRegistry,
    WaiterSignal, DEFAULT_QUERY_TIMEOUT,
};
pub use ipc::{
    await_pending, classify_response, HandlerChain, InboundCorrelator, InboundListener,
    IqDispatcher, IqHandler, ListenerSummary, PendingIq,
};
pub use ports::{InboundHandler, NodeReceiver, NodeSender, TransportError};
pub use service::IqSession;

pub use tokio_util::sync::CancellationToken;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
