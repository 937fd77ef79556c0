//! Operation dispatch: the fixed per-verb policy.
//!
//! Every filesystem verb the kernel transport can deliver resolves to
//! one of the entry points here. Verbs with no counterpart in this
//! filesystem (links, xattrs, writes, locking, ...) are rejected with
//! [`FsError::NotSupported`] via [`LazyFs::unsupported`].

use crate::attr::FileAttributes;
use crate::content;
use crate::error::FsError;
use crate::registry::PathRegistry;

/// Path of the synthetic root directory.
pub const ROOT_PATH: &str = "/";

/// The lazy filesystem core.
///
/// Owns the path registry and implements the per-verb policy. The kernel
/// transport calls these entry points, possibly concurrently from
/// multiple worker threads; the registry's lock is the only
/// synchronization required.
#[derive(Debug, Default)]
pub struct LazyFs {
    registry: PathRegistry,
}

impl LazyFs {
    /// Create a filesystem with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: PathRegistry::new(),
        }
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    /// Report attributes for `path`.
    ///
    /// The root is a permissive directory with link count 2; everything
    /// else is a regular file whose size is whatever the registry holds.
    pub fn getattr(&self, path: &str) -> Result<FileAttributes, FsError> {
        if path == ROOT_PATH {
            return Ok(FileAttributes::root_directory());
        }
        match self.registry.find(path) {
            Some(size) => Ok(FileAttributes::regular_file(size)),
            None => Err(FsError::NotFound(path.to_string())),
        }
    }

    /// Open `path`.
    ///
    /// Access rights and flags are never checked; `truncate` reflects
    /// O_TRUNC and zeroes the logical size.
    pub fn open(&self, path: &str, truncate: bool) -> Result<(), FsError> {
        if self.registry.find(path).is_none() {
            return Err(FsError::NotFound(path.to_string()));
        }
        if truncate {
            self.registry.set_size(path, 0)?;
        }
        Ok(())
    }

    /// Read `length` bytes at `offset` from `path`.
    ///
    /// # Returns
    /// The sentinel bytes actually read; a short or empty vector signals
    /// end-of-file.
    pub fn read(&self, path: &str, offset: u64, length: usize) -> Result<Vec<u8>, FsError> {
        let size = self
            .registry
            .find(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        Ok(content::generate(size, offset, length))
    }

    /// Read into a caller-supplied buffer, zero-padding past end-of-file.
    ///
    /// # Returns
    /// The effective number of bytes read.
    pub fn read_into(&self, path: &str, offset: u64, buf: &mut [u8]) -> Result<usize, FsError> {
        let size = self
            .registry
            .find(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        Ok(content::fill(buf, size, offset))
    }

    /// Set the logical size of `path`.
    ///
    /// Also serves resize-on-open-file; the two verbs are identical for
    /// this filesystem.
    pub fn truncate(&self, path: &str, new_size: u64) -> Result<(), FsError> {
        self.registry.set_size(path, new_size)
    }

    /// Create `path` as an empty file.
    ///
    /// Idempotent insert-or-reset: an existing entry has its size reset
    /// to 0, unless `exclusive` is set, which fails with
    /// [`FsError::AlreadyExists`] instead.
    pub fn create(&self, path: &str, exclusive: bool) -> Result<(), FsError> {
        // The root is a directory, never a registry entry.
        if path == ROOT_PATH {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        // Create always starts from an empty file, even when the path
        // already existed. The registry performs the exclusive check and
        // the insert as one atomic step.
        self.registry.create(path, exclusive)
    }

    /// Remove the registry entry for `path`.
    pub fn remove(&self, path: &str) -> Result<(), FsError> {
        self.registry.remove(path)
    }

    /// Open a directory. Only the root exists.
    pub fn opendir(&self, path: &str) -> Result<(), FsError> {
        if path == ROOT_PATH {
            Ok(())
        } else {
            Err(FsError::NotFound(path.to_string()))
        }
    }

    /// List the root directory.
    ///
    /// # Returns
    /// `.`, `..`, and the base name (leading separator stripped) of
    /// every registered file, in no particular order.
    pub fn readdir(&self, path: &str) -> Result<Vec<String>, FsError> {
        if path != ROOT_PATH {
            return Err(FsError::NotFound(path.to_string()));
        }
        let mut entries: Vec<String> = vec![".".to_string(), "..".to_string()];
        for registered in self.registry.list() {
            let name = registered.strip_prefix('/').unwrap_or(&registered);
            entries.push(name.to_string());
        }
        Ok(entries)
    }

    /// Flush an open file. Nothing is buffered, so this always succeeds.
    pub fn flush(&self, _path: &str) -> Result<(), FsError> {
        Ok(())
    }

    /// Close an open file. There is no per-handle state to release.
    pub fn release(&self, _path: &str) -> Result<(), FsError> {
        Ok(())
    }

    /// Check access to `path`. Everybody is trusted.
    pub fn access(&self, _path: &str) -> Result<(), FsError> {
        Ok(())
    }

    /// Tear down the filesystem, releasing every registry entry.
    pub fn destroy(&self) {
        self.registry.clear();
    }

    /// Reject a verb this filesystem intentionally does not implement.
    pub fn unsupported(&self, verb: &'static str) -> Result<(), FsError> {
        Err(FsError::NotSupported(verb))
    }
}
