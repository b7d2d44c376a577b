//! Window state

use serde::{Deserialize, Serialize};

use crate::math::{Size, Vec2};

/// Options consumed by the file-picker collaborator; opaque to the registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PickerOptions {
    /// Extensions the picker should offer
    pub file_types: Vec<String>,
    /// Whether multiple selection is allowed
    pub allow_multiple: bool,
}

/// One desktop window.
///
/// Focus is not stored here; it is derived from the registry's active
/// window id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Window {
    /// Caller-supplied identifier, unique within the registry
    pub id: String,
    /// Window title
    pub title: String,
    /// Owning application identifier, used by the content collaborator
    pub app_id: String,
    /// Origin of the window on the desktop
    pub position: Vec2,
    /// Current dimensions
    pub size: Size,
    /// Origin captured on maximize, consumed on restore
    pub prev_position: Option<Vec2>,
    /// Dimensions captured on maximize, consumed on restore
    pub prev_size: Option<Size>,
    /// Stacking order; the focused window holds the highest value
    pub z_index: i32,
    pub maximized: bool,
    pub minimized: bool,
    pub no_resize: bool,
    pub no_controls: bool,
    /// Bound document path, resolved through the app collaborator
    pub file_path: Option<String>,
    /// File-picker configuration (picker windows only)
    pub picker: Option<PickerOptions>,
    /// Selection recorded by the file-picker collaborator
    pub selected_file: Option<String>,
}
