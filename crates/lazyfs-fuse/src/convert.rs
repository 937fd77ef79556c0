//! Conversion between core types and FUSE reply types.

use std::time::UNIX_EPOCH;

use fuser::{FileAttr, FileType};
use lazyfs::{FileAttributes, FileKind, FsError};

/// Convert a core error to the errno reported to the kernel.
pub fn to_errno(err: &FsError) -> i32 {
    match err {
        FsError::NotFound(_) => libc::ENOENT,
        FsError::NotSupported(_) => libc::ENOSYS,
        FsError::AlreadyExists(_) => libc::EEXIST,
    }
}

/// Convert core attributes to FUSE file attributes.
///
/// All timestamps are the Unix epoch; the filesystem has no clock.
pub fn to_file_attr(ino: u64, attr: &FileAttributes) -> FileAttr {
    let kind: FileType = match attr.kind {
        FileKind::RegularFile => FileType::RegularFile,
        FileKind::Directory => FileType::Directory,
    };

    FileAttr {
        ino,
        size: attr.size,
        blocks: attr.blocks,
        atime: UNIX_EPOCH,
        mtime: UNIX_EPOCH,
        ctime: UNIX_EPOCH,
        crtime: UNIX_EPOCH,
        kind,
        perm: attr.perm,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        rdev: 0,
        blksize: 512,
        flags: 0,
    }
}
