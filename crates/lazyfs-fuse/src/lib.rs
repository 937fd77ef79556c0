//! FUSE transport for the lazyfs storage-free virtual filesystem.
//!
//! This crate is the kernel-facing side of lazyfs: it receives raw
//! filesystem requests via the `fuser` crate, translates them into calls
//! on the [`lazyfs`] core, and marshals results back into FUSE replies.
//!
//! # Architecture
//!
//! ```text
//! kernel ←→ fuser ←→ LazyFuse (Filesystem impl)
//!                        │
//!                        ├── InodeTable (inode number ↔ path)
//!                        ├── convert (attrs, errnos)
//!                        └── lazyfs::LazyFs (the core)
//! ```
//!
//! The kernel addresses objects by inode number while the core is
//! path-addressed; [`InodeTable`] bridges the two.

mod convert;
mod fuse;
mod inode;

pub use fuse::{mount, spawn_mount, LazyFuse};
pub use inode::{InodeTable, ROOT_INODE};

// Re-export the core for transport consumers.
pub use lazyfs::{FileAttributes, FileKind, FsError, LazyFs};
