//! Metadata types for the VFS layer

use serde::{Deserialize, Serialize};

use crate::path::filename;

/// What kind of node a path resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InodeType {
    File,
    Directory,
}

/// Metadata returned by `stat`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Full normalized path
    pub path: String,
    /// Last path component
    pub name: String,
    pub inode_type: InodeType,
    /// Content size in bytes (0 for directories)
    pub size: u64,
    /// Logical modification timestamp
    pub modified: u64,
}

impl Metadata {
    /// Metadata for a directory node
    pub fn directory(path: impl Into<String>, modified: u64) -> Self {
        let path = path.into();
        let name = filename(&path).to_string();
        Self {
            path,
            name,
            inode_type: InodeType::Directory,
            size: 0,
            modified,
        }
    }

    /// Metadata for a file node
    pub fn file(path: impl Into<String>, size: u64, modified: u64) -> Self {
        let path = path.into();
        let name = filename(&path).to_string();
        Self {
            path,
            name,
            inode_type: InodeType::File,
            size,
            modified,
        }
    }

    /// True for directory nodes
    pub fn is_directory(&self) -> bool {
        self.inode_type == InodeType::Directory
    }

    /// True for file nodes
    pub fn is_file(&self) -> bool {
        self.inode_type == InodeType::File
    }
}

/// Directory listing entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub inode_type: InodeType,
    pub size: u64,
}
