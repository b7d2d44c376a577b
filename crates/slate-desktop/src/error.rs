//! Error types for the desktop layer

use thiserror::Error;

/// Errors from window registry operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DesktopError {
    /// Every registry operation is keyed by window id, so a descriptor
    /// without one cannot produce a usable window.
    #[error("window descriptor is missing an id")]
    MissingWindowId,
}
