//! Error types for the lazyfs core.

use thiserror::Error;

/// Errors reported to the kernel transport for a single request.
///
/// Every failure is a definitive, synchronously reported outcome; there
/// is nothing transient to retry. Startup failures (running as root,
/// missing mountpoint) are process-fatal and not part of this taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Path is not registered in the filesystem.
    #[error("No such file: {0}")]
    NotFound(String),

    /// Verb the filesystem intentionally does not implement.
    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),

    /// Exclusive create requested against an existing path.
    #[error("File already exists: {0}")]
    AlreadyExists(String),
}
