//! Restricted script execution context for Slate programs
//!
//! Builds a raw engine exposing only a whitelisted capability surface
//! (console, tracked timers, message port, window creation, app lifecycle)
//! to untrusted script text, and remembers every timer, interval, and
//! animation-frame handle it hands out so termination can revoke them all.

mod api;
mod report;
mod sandbox;
mod timers;

pub use sandbox::{Outcome, Sandbox};
pub use timers::{FrameQueue, TimerHandle, TimerWheel};
