//! Path registry mapping virtual file paths to logical sizes.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::FsError;

/// Maps virtual file paths to logical sizes.
///
/// The single source of truth for which virtual files exist. Size is the
/// only attribute this filesystem cares about; nothing else is stored and
/// nothing survives a restart. The root directory `/` is never a member;
/// the dispatcher synthesizes it.
///
/// # Thread Safety
/// A single lock guards the whole map. The kernel transport may issue
/// lookups, inserts and size mutations concurrently from multiple worker
/// threads; each mutation is one atomic step under the write lock.
#[derive(Debug, Default)]
pub struct PathRegistry {
    /// Logical size in bytes, keyed by absolute path.
    files: RwLock<HashMap<String, u64>>,
}

impl PathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Insert `path` with size 0 if absent.
    ///
    /// # Returns
    /// The size of the entry: the existing size, or 0 for a new entry.
    pub fn insert_if_absent(&self, path: &str) -> u64 {
        let mut files = self.files.write().unwrap();
        *files.entry(path.to_string()).or_insert(0)
    }

    /// Register `path` as an empty file.
    ///
    /// An existing entry is reset to size 0; with `exclusive` set it is
    /// an [`FsError::AlreadyExists`] error instead. The check and the
    /// insert happen under one write-lock acquisition, so two exclusive
    /// creates racing on the same path cannot both succeed.
    pub fn create(&self, path: &str, exclusive: bool) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        match files.entry(path.to_string()) {
            Entry::Occupied(mut entry) => {
                if exclusive {
                    return Err(FsError::AlreadyExists(path.to_string()));
                }
                *entry.get_mut() = 0;
            }
            Entry::Vacant(entry) => {
                entry.insert(0);
            }
        }
        Ok(())
    }

    /// Look up the logical size of `path`.
    ///
    /// # Returns
    /// The size if the path is registered.
    pub fn find(&self, path: &str) -> Option<u64> {
        let files = self.files.read().unwrap();
        files.get(path).copied()
    }

    /// Set the logical size of an existing entry.
    ///
    /// Grows and shrinks are equally cheap; no allocation is implied.
    pub fn set_size(&self, path: &str, size: u64) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        match files.get_mut(path) {
            Some(entry) => {
                *entry = size;
                Ok(())
            }
            None => Err(FsError::NotFound(path.to_string())),
        }
    }

    /// Delete the entry for `path`.
    pub fn remove(&self, path: &str) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    /// All registered paths, in no particular order.
    pub fn list(&self) -> Vec<String> {
        let files = self.files.read().unwrap();
        files.keys().cloned().collect()
    }

    /// Release every entry. Used at filesystem teardown.
    pub fn clear(&self) {
        let mut files = self.files.write().unwrap();
        files.clear();
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        let files = self.files.read().unwrap();
        files.len()
    }

    /// Check whether no files are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = PathRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_insert_if_absent_starts_at_zero() {
        let registry = PathRegistry::new();
        assert_eq!(registry.insert_if_absent("/a"), 0);
        assert_eq!(registry.find("/a"), Some(0));
    }

    #[test]
    fn test_insert_if_absent_keeps_existing_size() {
        let registry = PathRegistry::new();
        registry.insert_if_absent("/a");
        registry.set_size("/a", 42).unwrap();

        // A second insert must not disturb the existing entry.
        assert_eq!(registry.insert_if_absent("/a"), 42);
        assert_eq!(registry.find("/a"), Some(42));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_resets_existing_entry() {
        let registry = PathRegistry::new();
        registry.create("/a", false).unwrap();
        registry.set_size("/a", 42).unwrap();

        registry.create("/a", false).unwrap();
        assert_eq!(registry.find("/a"), Some(0));
    }

    #[test]
    fn test_exclusive_create_rejects_existing_entry() {
        let registry = PathRegistry::new();
        registry.create("/a", false).unwrap();

        let result = registry.create("/a", true);
        assert!(matches!(result, Err(FsError::AlreadyExists(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_size_unknown_path() {
        let registry = PathRegistry::new();
        let result = registry.set_size("/missing", 10);
        assert!(matches!(result, Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_set_size_supports_huge_values() {
        let registry = PathRegistry::new();
        registry.insert_if_absent("/huge");
        registry.set_size("/huge", 1 << 50).unwrap();
        assert_eq!(registry.find("/huge"), Some(1 << 50));
    }

    #[test]
    fn test_remove_deletes_entry() {
        let registry = PathRegistry::new();
        registry.insert_if_absent("/a");
        registry.remove("/a").unwrap();
        assert_eq!(registry.find("/a"), None);
    }

    #[test]
    fn test_remove_unknown_path() {
        let registry = PathRegistry::new();
        assert!(matches!(registry.remove("/a"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_clear_drains_everything() {
        let registry = PathRegistry::new();
        registry.insert_if_absent("/a");
        registry.insert_if_absent("/b");
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_returns_all_paths() {
        let registry = PathRegistry::new();
        registry.insert_if_absent("/a");
        registry.insert_if_absent("/b");

        let mut paths = registry.list();
        paths.sort();
        assert_eq!(paths, vec!["/a".to_string(), "/b".to_string()]);
    }
}
