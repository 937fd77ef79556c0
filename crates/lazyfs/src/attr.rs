//! File attributes reported by the dispatcher.

/// Root directory permissions (rwxr-xr-x).
pub const ROOT_DIR_PERMS: u16 = 0o755;

/// Virtual file permissions (rwxrwxrwx). Access is never enforced.
pub const FILE_PERMS: u16 = 0o777;

/// Kind of filesystem object. Only regular files and the single root
/// directory exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file.
    RegularFile,
    /// Directory (only the root).
    Directory,
}

/// Attributes of a virtual filesystem object.
///
/// All timestamps are the Unix epoch; the filesystem has no clock, so
/// none are carried here. Ownership is always the identity of the
/// serving process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    /// Object kind.
    pub kind: FileKind,
    /// POSIX permission bits.
    pub perm: u16,
    /// Hard link count (2 for the root directory, 1 for files).
    pub nlink: u32,
    /// Logical size in bytes.
    pub size: u64,
    /// Number of 512-byte blocks attributed to the logical size.
    pub blocks: u64,
    /// Owner user ID.
    pub uid: u32,
    /// Owner group ID.
    pub gid: u32,
}

impl FileAttributes {
    /// Attributes of the synthetic root directory.
    pub fn root_directory() -> Self {
        Self {
            kind: FileKind::Directory,
            perm: ROOT_DIR_PERMS,
            nlink: 2,
            size: 0,
            blocks: 0,
            uid: process_uid(),
            gid: process_gid(),
        }
    }

    /// Attributes of a regular virtual file of the given logical size.
    pub fn regular_file(size: u64) -> Self {
        Self {
            kind: FileKind::RegularFile,
            perm: FILE_PERMS,
            nlink: 1,
            size,
            blocks: size / 512,
            uid: process_uid(),
            gid: process_gid(),
        }
    }
}

/// Real user ID of the serving process.
fn process_uid() -> u32 {
    unsafe { libc::getuid() }
}

/// Real group ID of the serving process.
fn process_gid() -> u32 {
    unsafe { libc::getgid() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_directory_attributes() {
        let attr = FileAttributes::root_directory();
        assert_eq!(attr.kind, FileKind::Directory);
        assert_eq!(attr.perm, 0o755);
        assert_eq!(attr.nlink, 2);
    }

    #[test]
    fn test_regular_file_attributes() {
        let attr = FileAttributes::regular_file(1024);
        assert_eq!(attr.kind, FileKind::RegularFile);
        assert_eq!(attr.perm, 0o777);
        assert_eq!(attr.nlink, 1);
        assert_eq!(attr.size, 1024);
        assert_eq!(attr.blocks, 2);
    }

    #[test]
    fn test_block_count_is_integer_division() {
        assert_eq!(FileAttributes::regular_file(0).blocks, 0);
        assert_eq!(FileAttributes::regular_file(511).blocks, 0);
        assert_eq!(FileAttributes::regular_file(512).blocks, 1);
        assert_eq!(FileAttributes::regular_file(1023).blocks, 1);
    }
}
