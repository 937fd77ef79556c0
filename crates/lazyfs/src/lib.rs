//! Storage-free virtual filesystem core.
//!
//! This crate implements files that have a configured logical size but no
//! real backing content: reads return a fixed sentinel byte for every
//! in-bounds position, and nothing is ever stored. It exists to simulate
//! huge files (e.g. 1 TiB) when exercising storage and I/O systems,
//! without allocating any real disk space.
//!
//! # Architecture
//!
//! ```text
//! Kernel transport (e.g. lazyfs-fuse)
//!         │
//!         ▼
//! LazyFs (operation dispatch, per-verb policy)
//!         │
//!         ├── PathRegistry (path → logical size, the only shared state)
//!         └── content (pure sentinel/zero byte generation)
//! ```
//!
//! The namespace is flat: a single root directory holding regular files.
//! Directories beyond the root, symlinks, links, xattrs and locking are
//! intentionally unsupported.
//!
//! # Example
//!
//! ```
//! use lazyfs::LazyFs;
//!
//! let fs = LazyFs::new();
//! fs.create("/big", false).unwrap();
//! fs.truncate("/big", 1 << 40).unwrap();
//!
//! let attr = fs.getattr("/big").unwrap();
//! assert_eq!(attr.size, 1 << 40);
//!
//! let data = fs.read("/big", 0, 16).unwrap();
//! assert_eq!(data, vec![lazyfs::content::SENTINEL_BYTE; 16]);
//! ```

pub mod attr;
pub mod content;
pub mod error;
pub mod ops;
pub mod registry;

pub use attr::{FileAttributes, FileKind};
pub use error::FsError;
pub use ops::{LazyFs, ROOT_PATH};
pub use registry::PathRegistry;
