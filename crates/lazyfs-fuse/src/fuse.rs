//! FUSE filesystem implementation.

use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime};

use fuser::{
    FileType, Filesystem, MountOption, ReplyAttr, ReplyBmap, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyLock, ReplyOpen, ReplyStatfs, ReplyWrite,
    ReplyXattr, Request, TimeOrNow,
};
use lazyfs::LazyFs;

use crate::convert::{to_errno, to_file_attr};
use crate::inode::{InodeTable, ROOT_INODE};

/// How long the kernel may cache attributes and entries.
///
/// Attributes only ever change through this mount, so a short TTL is
/// purely a liveness knob for external observers.
const TTL: Duration = Duration::from_secs(1);

/// FUSE transport for the lazyfs core.
///
/// Translates inode-addressed kernel requests into path-addressed core
/// calls and maps typed core errors onto errnos.
pub struct LazyFuse {
    /// The storage-free filesystem core.
    fs: LazyFs,
    /// Inode number to path mapping.
    inodes: InodeTable,
}

impl LazyFuse {
    /// Create a transport around a fresh, empty filesystem.
    pub fn new() -> Self {
        Self {
            fs: LazyFs::new(),
            inodes: InodeTable::new(),
        }
    }

    /// Access the filesystem core.
    pub fn fs(&self) -> &LazyFs {
        &self.fs
    }

    /// Registry path for a child of the root directory.
    ///
    /// # Returns
    /// The absolute path, or None when the parent is not the root or the
    /// name is not valid UTF-8.
    fn child_path(&self, parent: u64, name: &OsStr) -> Option<String> {
        if parent != ROOT_INODE {
            return None;
        }
        let name = name.to_str()?;
        Some(format!("/{}", name))
    }

    /// Errno for a verb the filesystem intentionally does not implement.
    ///
    /// Routed through the core so the dispatch policy stays in one place.
    fn unsupported(&self, verb: &'static str) -> i32 {
        match self.fs.unsupported(verb) {
            Err(err) => to_errno(&err),
            Ok(()) => 0,
        }
    }
}

impl Default for LazyFuse {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LazyFuse {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let path: String = match self.child_path(parent, name) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        match self.fs.getattr(&path) {
            Ok(attr) => {
                let ino: u64 = self.inodes.assign(&path);
                reply.entry(&TTL, &to_file_attr(ino, &attr), 0);
            }
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        let path: String = match self.inodes.path_of(ino) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        match self.fs.getattr(&path) {
            Ok(attr) => reply.attr(&TTL, &to_file_attr(ino, &attr)),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let path: String = match self.inodes.path_of(ino) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        // Only the logical size can change. Mode, ownership and
        // timestamp updates are rejected like their standalone verbs.
        if mode.is_some() || uid.is_some() || gid.is_some() || flags.is_some() {
            reply.error(self.unsupported("chmod/chown"));
            return;
        }
        if atime.is_some() || mtime.is_some() {
            reply.error(self.unsupported("utimens"));
            return;
        }

        if let Some(new_size) = size {
            tracing::trace!("truncate: {} -> {}", path, new_size);
            if let Err(err) = self.fs.truncate(&path, new_size) {
                reply.error(to_errno(&err));
                return;
            }
        }

        match self.fs.getattr(&path) {
            Ok(attr) => reply.attr(&TTL, &to_file_attr(ino, &attr)),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        let path: String = match self.inodes.path_of(ino) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        let truncate: bool = flags & libc::O_TRUNC != 0;
        tracing::trace!("open: {} truncate={}", path, truncate);
        match self.fs.open(&path, truncate) {
            // No per-handle state; the handle number carries no meaning.
            Ok(()) => reply.opened(0, 0),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let path: String = match self.inodes.path_of(ino) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        match self.fs.read(&path, offset as u64, size as usize) {
            Ok(data) => reply.data(&data),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        flags: i32,
        reply: ReplyCreate,
    ) {
        let path: String = match self.child_path(parent, name) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        let exclusive: bool = flags & libc::O_EXCL != 0;
        tracing::trace!("create: {} exclusive={}", path, exclusive);
        if let Err(err) = self.fs.create(&path, exclusive) {
            reply.error(to_errno(&err));
            return;
        }

        let ino: u64 = self.inodes.assign(&path);
        match self.fs.getattr(&path) {
            Ok(attr) => reply.created(&TTL, &to_file_attr(ino, &attr), 0, 0, 0),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let path: String = match self.child_path(parent, name) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        tracing::trace!("unlink: {}", path);
        match self.fs.remove(&path) {
            Ok(()) => {
                self.inodes.forget_path(&path);
                reply.ok();
            }
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        let path: String = match self.inodes.path_of(ino) {
            Some(p) => p,
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        match self.fs.opendir(&path) {
            Ok(()) => reply.opened(0, 0),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        if ino != ROOT_INODE {
            reply.error(libc::ENOENT);
            return;
        }

        let mut entries: Vec<(u64, FileType, String)> = vec![
            (ROOT_INODE, FileType::Directory, ".".to_string()),
            (ROOT_INODE, FileType::Directory, "..".to_string()),
        ];

        for path in self.fs.registry().list() {
            let name: String = path.strip_prefix('/').unwrap_or(&path).to_string();
            let child_ino: u64 = self.inodes.assign(&path);
            entries.push((child_ino, FileType::RegularFile, name));
        }

        for (i, (e_ino, kind, name)) in entries.iter().enumerate().skip(offset as usize) {
            if reply.add(*e_ino, (i + 1) as i64, *kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn flush(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        let path: String = self.inodes.path_of(ino).unwrap_or_default();
        match self.fs.flush(&path) {
            Ok(()) => reply.ok(),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        let path: String = self.inodes.path_of(ino).unwrap_or_default();
        match self.fs.release(&path) {
            Ok(()) => reply.ok(),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, _mask: i32, reply: ReplyEmpty) {
        let path: String = self.inodes.path_of(ino).unwrap_or_default();
        match self.fs.access(&path) {
            Ok(()) => reply.ok(),
            Err(err) => reply.error(to_errno(&err)),
        }
    }

    fn destroy(&mut self) {
        tracing::debug!("unmount: draining registry");
        self.fs.destroy();
    }

    // Everything below is intentionally unimplemented.

    fn readlink(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyData) {
        reply.error(self.unsupported("readlink"));
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        reply.error(self.unsupported("mknod"));
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(self.unsupported("mkdir"));
    }

    fn rmdir(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(self.unsupported("rmdir"));
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _link_name: &OsStr,
        _target: &Path,
        reply: ReplyEntry,
    ) {
        reply.error(self.unsupported("symlink"));
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(self.unsupported("rename"));
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _newparent: u64,
        _newname: &OsStr,
        reply: ReplyEntry,
    ) {
        reply.error(self.unsupported("link"));
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        reply.error(self.unsupported("write"));
    }

    fn fsync(&mut self, _req: &Request<'_>, _ino: u64, _fh: u64, _datasync: bool, reply: ReplyEmpty) {
        reply.error(self.unsupported("fsync"));
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        reply.error(self.unsupported("statfs"));
    }

    fn setxattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _name: &OsStr,
        _value: &[u8],
        _flags: i32,
        _position: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(self.unsupported("setxattr"));
    }

    fn getxattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _name: &OsStr,
        _size: u32,
        reply: ReplyXattr,
    ) {
        reply.error(self.unsupported("getxattr"));
    }

    fn listxattr(&mut self, _req: &Request<'_>, _ino: u64, _size: u32, reply: ReplyXattr) {
        reply.error(self.unsupported("listxattr"));
    }

    fn removexattr(&mut self, _req: &Request<'_>, _ino: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(self.unsupported("removexattr"));
    }

    #[allow(clippy::too_many_arguments)]
    fn getlk(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _lock_owner: u64,
        _start: u64,
        _end: u64,
        _typ: i32,
        _pid: u32,
        reply: ReplyLock,
    ) {
        reply.error(self.unsupported("getlk"));
    }

    #[allow(clippy::too_many_arguments)]
    fn setlk(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _lock_owner: u64,
        _start: u64,
        _end: u64,
        _typ: i32,
        _pid: u32,
        _sleep: bool,
        reply: ReplyEmpty,
    ) {
        reply.error(self.unsupported("setlk"));
    }

    fn bmap(&mut self, _req: &Request<'_>, _ino: u64, _blocksize: u32, _idx: u64, reply: ReplyBmap) {
        reply.error(self.unsupported("bmap"));
    }

    fn releasedir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        reply: ReplyEmpty,
    ) {
        reply.error(self.unsupported("releasedir"));
    }

    fn fsyncdir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _datasync: bool,
        reply: ReplyEmpty,
    ) {
        reply.error(self.unsupported("fsyncdir"));
    }
}

/// Mount the filesystem and serve requests until unmounted.
///
/// # Arguments
/// * `fs` - The transport to mount
/// * `mountpoint` - Path to mount at
/// * `extra` - Additional mount options passed through from the CLI
pub fn mount(fs: LazyFuse, mountpoint: &Path, extra: &[MountOption]) -> std::io::Result<()> {
    let mut options: Vec<MountOption> = vec![MountOption::FSName("lazyfs".into())];
    options.extend_from_slice(extra);
    fuser::mount2(fs, mountpoint, &options)
}

/// Spawn the mount in the background.
///
/// # Returns
/// A session handle; dropping it unmounts the filesystem.
pub fn spawn_mount(
    fs: LazyFuse,
    mountpoint: &Path,
    extra: &[MountOption],
) -> std::io::Result<fuser::BackgroundSession> {
    let mut options: Vec<MountOption> = vec![MountOption::FSName("lazyfs".into())];
    options.extend_from_slice(extra);
    fuser::spawn_mount2(fs, mountpoint, &options)
}
