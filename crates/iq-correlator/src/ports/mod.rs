//! Ports Layer
//!
//! - Driving Ports (inbound) - node source and inbound handlers
//! - Driven Ports (outbound) - node sender

pub mod inbound;
pub mod outbound;

pub use inbound::{InboundHandler, NodeReceiver};
pub use outbound::{NodeSender, TransportError};
