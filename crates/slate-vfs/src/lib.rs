//! Virtual filesystem layer for Slate
//!
//! Hierarchical absolute paths, a service trait consumed by the runtime,
//! and an in-memory backend holding a session's files.

mod error;
mod memory;
mod path;
mod service;
mod types;

pub use error::VfsError;
pub use memory::MemoryVfs;
pub use path::{filename, join_path, normalize_path, parent_path, validate_path};
pub use service::Vfs;
pub use types::{DirEntry, InodeType, Metadata};
