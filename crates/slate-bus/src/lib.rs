//! Per-process message bus for Slate
//!
//! Relays structured messages from a running program to any number of
//! observers, decoupled from the sandbox's lifetime. Delivery is
//! synchronous, at-most-once, in publish order per pid; late subscribers
//! never see history.

mod bus;
mod message;

pub use bus::{Listener, MessageBus};
pub use message::BusMessage;
