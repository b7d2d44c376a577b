//! Window configuration for creation and partial updates

use crate::math::{Size, Vec2};

use super::PickerOptions;

/// Configuration for creating a window
#[derive(Clone, Debug, Default)]
pub struct WindowConfig {
    /// Window identifier (required; creation fails without one)
    pub id: String,
    /// Window title
    pub title: String,
    /// Owning application identifier
    pub app_id: String,
    /// Initial position (None = cached position or default)
    pub position: Option<Vec2>,
    /// Initial size (None = default)
    pub size: Option<Size>,
    pub no_resize: bool,
    pub no_controls: bool,
    /// Bound document path
    pub file_path: Option<String>,
    /// File-picker configuration
    pub picker: Option<PickerOptions>,
}

/// Partial update applied by collaborators (deep links, picker results).
///
/// Only the supplied fields change; everything else is left as-is.
#[derive(Clone, Debug, Default)]
pub struct WindowUpdate {
    pub title: Option<String>,
    pub position: Option<Vec2>,
    pub size: Option<Size>,
    pub file_path: Option<String>,
    pub selected_file: Option<String>,
    pub picker: Option<PickerOptions>,
}
