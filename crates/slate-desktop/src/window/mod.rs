//! Window management module
//!
//! Provides window lifecycle, focus management, and geometry clamping.

mod config;
mod registry;
#[allow(clippy::module_inception)]
mod window;

pub use config::{WindowConfig, WindowUpdate};
pub use registry::{WindowRegistry, DEFAULT_POSITION, DEFAULT_SIZE, EDGE_MARGIN, MIN_SIZE};
pub use window::{PickerOptions, Window};
