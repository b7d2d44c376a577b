//! Vfs service trait definition

use crate::error::VfsError;
use crate::types::{DirEntry, Metadata};

/// Virtual filesystem service interface.
///
/// The runtime reads program source through this seam; the storage backend
/// behind it is not specified here.
pub trait Vfs {
    /// Read a file's bytes.
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &str) -> Result<String, VfsError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| VfsError::io(e.to_string()))
    }

    /// Write a file (create or overwrite).
    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), VfsError>;

    /// Check if a path exists.
    fn exists(&self, path: &str) -> Result<bool, VfsError>;

    /// Get node metadata.
    fn stat(&self, path: &str) -> Result<Metadata, VfsError>;

    /// List directory contents.
    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError>;

    /// Create a directory and all parent directories.
    fn mkdir_p(&self, path: &str) -> Result<(), VfsError>;

    /// Delete a file.
    fn unlink(&self, path: &str) -> Result<(), VfsError>;
}
