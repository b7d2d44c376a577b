//! Desktop window management for Slate
//!
//! Provides the window registry (lifecycle, focus, z-order, geometry
//! clamping against the live viewport), the session-lifetime position
//! cache, and layout snapshot persistence.

mod error;
pub mod math;
mod persistence;
mod position_cache;
mod viewport;
mod window;

pub use error::DesktopError;
pub use persistence::Snapshot;
pub use position_cache::PositionCache;
pub use viewport::Viewport;
pub use window::{
    PickerOptions, Window, WindowConfig, WindowRegistry, WindowUpdate, DEFAULT_POSITION,
    DEFAULT_SIZE, EDGE_MARGIN, MIN_SIZE,
};
