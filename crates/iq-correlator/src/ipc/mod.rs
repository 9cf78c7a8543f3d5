//! Query dispatch and response routing.
//!
//! The outbound half registers a waiter and sends the envelope, the inbound
//! half routes each response envelope back to its waiter by `id`.

pub mod dispatcher;
pub mod handler;
pub mod inbound;

pub use dispatcher::{IqDispatcher, PendingIq};
pub use handler::{await_pending, classify_response, IqHandler};
pub use inbound::{HandlerChain, InboundCorrelator, InboundListener, ListenerSummary};
