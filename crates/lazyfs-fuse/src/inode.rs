//! Inode table mapping FUSE inode numbers to registry paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use lazyfs::ROOT_PATH;

/// Root directory inode ID (always 1 per FUSE convention).
pub const ROOT_INODE: u64 = 1;

/// Double index between FUSE inode numbers and registry paths.
///
/// Inode numbers are allocated on first sight of a path and stay stable
/// until the path is unlinked. The root path maps to [`ROOT_INODE`]
/// permanently.
#[derive(Debug)]
pub struct InodeTable {
    /// Next inode ID to allocate.
    next_id: AtomicU64,
    /// Inode ID to path.
    paths: RwLock<HashMap<u64, String>>,
    /// Path to inode ID index.
    index: RwLock<HashMap<String, u64>>,
}

impl InodeTable {
    /// Create a table holding only the root mapping.
    pub fn new() -> Self {
        let table = Self {
            next_id: AtomicU64::new(ROOT_INODE + 1),
            paths: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
        };
        table
            .paths
            .write()
            .unwrap()
            .insert(ROOT_INODE, ROOT_PATH.to_string());
        table
            .index
            .write()
            .unwrap()
            .insert(ROOT_PATH.to_string(), ROOT_INODE);
        table
    }

    /// Allocate a new inode ID.
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Inode number for `path`, allocating one if unseen.
    pub fn assign(&self, path: &str) -> u64 {
        let mut index = self.index.write().unwrap();
        if let Some(&id) = index.get(path) {
            return id;
        }
        let id = self.allocate_id();
        index.insert(path.to_string(), id);
        self.paths.write().unwrap().insert(id, path.to_string());
        id
    }

    /// Path for an inode number.
    pub fn path_of(&self, ino: u64) -> Option<String> {
        let paths = self.paths.read().unwrap();
        paths.get(&ino).cloned()
    }

    /// Inode number for a path, if one was assigned.
    pub fn lookup(&self, path: &str) -> Option<u64> {
        let index = self.index.read().unwrap();
        index.get(path).copied()
    }

    /// Drop the mapping for `path` after an unlink.
    pub fn forget_path(&self, path: &str) {
        let removed = {
            let mut index = self.index.write().unwrap();
            index.remove(path)
        };
        if let Some(id) = removed {
            self.paths.write().unwrap().remove(&id);
        }
    }

    /// Number of live mappings, the root included.
    pub fn len(&self) -> usize {
        let paths = self.paths.read().unwrap();
        paths.len()
    }

    /// Check whether only the root mapping exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_has_root() {
        let table = InodeTable::new();
        assert_eq!(table.path_of(ROOT_INODE).as_deref(), Some("/"));
        assert_eq!(table.lookup("/"), Some(ROOT_INODE));
        assert!(table.is_empty());
    }

    #[test]
    fn test_assign_is_stable() {
        let table = InodeTable::new();
        let a = table.assign("/a");
        let b = table.assign("/b");
        assert_ne!(a, b);
        assert!(a > ROOT_INODE);

        // Asking again returns the same number.
        assert_eq!(table.assign("/a"), a);
        assert_eq!(table.path_of(a).as_deref(), Some("/a"));
    }

    #[test]
    fn test_forget_path_drops_both_directions() {
        let table = InodeTable::new();
        let id = table.assign("/a");
        table.forget_path("/a");
        assert_eq!(table.lookup("/a"), None);
        assert_eq!(table.path_of(id), None);

        // A fresh assignment gets a fresh number.
        assert_ne!(table.assign("/a"), id);
    }

    #[test]
    fn test_forget_unknown_path_is_harmless() {
        let table = InodeTable::new();
        table.forget_path("/never-assigned");
        assert!(table.is_empty());
    }
}
