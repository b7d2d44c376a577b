//! Error types for the VFS layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from VFS operations.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum VfsError {
    /// Path not found
    #[error("path not found")]
    NotFound,

    /// Path already exists
    #[error("path already exists")]
    AlreadyExists,

    /// Not a directory
    #[error("not a directory")]
    NotADirectory,

    /// Not a file
    #[error("not a file")]
    NotAFile,

    /// Invalid path format
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// I/O error
    #[error("i/o error: {0}")]
    Io(String),
}

impl VfsError {
    /// Create an invalid path error with message.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Create an I/O error with message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound)
    }
}
