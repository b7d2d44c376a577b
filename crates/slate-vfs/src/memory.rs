//! In-memory VFS implementation
//!
//! A BTreeMap-backed VFS holding one session's files. Nothing persists
//! beyond the process.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::VfsError;
use crate::path::{filename, join_path, normalize_path, parent_path};
use crate::service::Vfs;
use crate::types::{DirEntry, InodeType, Metadata};

/// In-memory VFS backend.
pub struct MemoryVfs {
    /// Inode storage (path -> metadata)
    inodes: RefCell<BTreeMap<String, Metadata>>,
    /// Content storage (path -> content)
    content: RefCell<BTreeMap<String, Vec<u8>>>,
    /// Logical timestamp generator
    now: RefCell<u64>,
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVfs {
    /// Create a new empty in-memory VFS with a root directory.
    pub fn new() -> Self {
        let vfs = Self {
            inodes: RefCell::new(BTreeMap::new()),
            content: RefCell::new(BTreeMap::new()),
            now: RefCell::new(1000),
        };
        vfs.inodes
            .borrow_mut()
            .insert(String::from("/"), Metadata::directory("/", 1000));
        vfs
    }

    /// Get the current logical timestamp and advance it.
    fn get_now(&self) -> u64 {
        let mut now = self.now.borrow_mut();
        let current = *now;
        *now += 1;
        current
    }

    fn require_parent_dir(&self, path: &str) -> Result<(), VfsError> {
        let parent = parent_path(path);
        match self.inodes.borrow().get(&parent) {
            Some(node) if node.is_directory() => Ok(()),
            Some(_) => Err(VfsError::NotADirectory),
            None => Err(VfsError::NotFound),
        }
    }
}

impl Vfs for MemoryVfs {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        let path = normalize_path(path)?;
        let inodes = self.inodes.borrow();
        match inodes.get(&path) {
            Some(node) if node.is_file() => Ok(self
                .content
                .borrow()
                .get(&path)
                .cloned()
                .unwrap_or_default()),
            Some(_) => Err(VfsError::NotAFile),
            None => Err(VfsError::NotFound),
        }
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), VfsError> {
        let path = normalize_path(path)?;
        if path == "/" {
            return Err(VfsError::NotAFile);
        }
        if let Some(node) = self.inodes.borrow().get(&path) {
            if node.is_directory() {
                return Err(VfsError::NotAFile);
            }
        }
        self.require_parent_dir(&path)?;

        let now = self.get_now();
        self.inodes.borrow_mut().insert(
            path.clone(),
            Metadata::file(path.clone(), content.len() as u64, now),
        );
        self.content.borrow_mut().insert(path, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool, VfsError> {
        let path = normalize_path(path)?;
        Ok(self.inodes.borrow().contains_key(&path))
    }

    fn stat(&self, path: &str) -> Result<Metadata, VfsError> {
        let path = normalize_path(path)?;
        self.inodes
            .borrow()
            .get(&path)
            .cloned()
            .ok_or(VfsError::NotFound)
    }

    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let path = normalize_path(path)?;
        let inodes = self.inodes.borrow();
        match inodes.get(&path) {
            Some(node) if node.is_directory() => {}
            Some(_) => return Err(VfsError::NotADirectory),
            None => return Err(VfsError::NotFound),
        }

        let entries = inodes
            .iter()
            .filter(|(child, _)| child.as_str() != "/" && parent_path(child) == path)
            .map(|(child, node)| DirEntry {
                name: filename(child).to_string(),
                inode_type: node.inode_type,
                size: node.size,
            })
            .collect();
        Ok(entries)
    }

    fn mkdir_p(&self, path: &str) -> Result<(), VfsError> {
        let path = normalize_path(path)?;

        let mut current = String::from("/");
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current = join_path(&current, component);
            let existing = self.inodes.borrow().get(&current).cloned();
            match existing {
                Some(node) if node.is_directory() => continue,
                Some(_) => return Err(VfsError::NotADirectory),
                None => {
                    let now = self.get_now();
                    self.inodes
                        .borrow_mut()
                        .insert(current.clone(), Metadata::directory(current.clone(), now));
                }
            }
        }
        Ok(())
    }

    fn unlink(&self, path: &str) -> Result<(), VfsError> {
        let path = normalize_path(path)?;
        let is_file = match self.inodes.borrow().get(&path) {
            Some(node) => node.is_file(),
            None => return Err(VfsError::NotFound),
        };
        if !is_file {
            return Err(VfsError::NotAFile);
        }
        self.inodes.borrow_mut().remove(&path);
        self.content.borrow_mut().remove(&path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vfs_with_home() -> MemoryVfs {
        let vfs = MemoryVfs::new();
        vfs.mkdir_p("/home").unwrap();
        vfs
    }

    #[test]
    fn test_write_read_round_trip() {
        let vfs = vfs_with_home();
        vfs.write_file("/home/hello.txt", b"hello").unwrap();
        assert_eq!(vfs.read("/home/hello.txt").unwrap(), b"hello");
        assert_eq!(vfs.read_to_string("/home/hello.txt").unwrap(), "hello");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let vfs = MemoryVfs::new();
        assert_eq!(vfs.read("/nope").unwrap_err(), VfsError::NotFound);
    }

    #[test]
    fn test_write_requires_parent_directory() {
        let vfs = MemoryVfs::new();
        assert_eq!(
            vfs.write_file("/home/hello.txt", b"x").unwrap_err(),
            VfsError::NotFound
        );
    }

    #[test]
    fn test_mkdir_p_creates_chain() {
        let vfs = MemoryVfs::new();
        vfs.mkdir_p("/a/b/c").unwrap();
        assert!(vfs.exists("/a").unwrap());
        assert!(vfs.exists("/a/b").unwrap());
        assert!(vfs.stat("/a/b/c").unwrap().is_directory());
    }

    #[test]
    fn test_stat_and_readdir() {
        let vfs = vfs_with_home();
        vfs.write_file("/home/a.txt", b"aa").unwrap();
        vfs.write_file("/home/b.txt", b"b").unwrap();
        vfs.mkdir_p("/home/sub").unwrap();

        let meta = vfs.stat("/home/a.txt").unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.size, 2);
        assert_eq!(meta.name, "a.txt");

        let mut names: Vec<String> = vfs
            .readdir("/home")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn test_readdir_of_file_fails() {
        let vfs = vfs_with_home();
        vfs.write_file("/home/a.txt", b"aa").unwrap();
        assert_eq!(vfs.readdir("/home/a.txt").unwrap_err(), VfsError::NotADirectory);
    }

    #[test]
    fn test_unlink() {
        let vfs = vfs_with_home();
        vfs.write_file("/home/a.txt", b"aa").unwrap();
        vfs.unlink("/home/a.txt").unwrap();
        assert!(!vfs.exists("/home/a.txt").unwrap());
        assert_eq!(vfs.unlink("/home").unwrap_err(), VfsError::NotAFile);
    }

    #[test]
    fn test_paths_are_normalized() {
        let vfs = vfs_with_home();
        vfs.write_file("/home//./notes.txt", b"n").unwrap();
        assert_eq!(vfs.read_to_string("/home/notes.txt").unwrap(), "n");
    }
}
