//! Adapters for the correlator ports.
//!
//! Transport implementations of [`NodeSender`](crate::ports::NodeSender) and
//! [`NodeReceiver`](crate::ports::NodeReceiver).

pub mod link;
