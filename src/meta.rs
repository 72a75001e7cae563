//! File metadata probing and restoration.
//!
//! A [`FileMeta`] is captured once per file during the crawl and
//! replayed onto the destination after a copy: ownership first, then
//! permission bits, then access/modify times. Each restoration step is
//! best-effort; a failure is logged but never aborts the move, because
//! the copy has already committed the bytes.

use crate::error::Result;
use nix::sys::stat::utimes;
use nix::sys::time::TimeVal;
use nix::unistd::{chown, Gid, Uid};
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;
use tracing::warn;

/// Ownership, permissions, timestamps and size of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub atime: i64,
    pub atime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub size: u64,
}

impl FileMeta {
    /// Read metadata for `path`.
    pub fn probe(path: &Path) -> Result<Self> {
        let md = fs::metadata(path)?;
        Ok(Self {
            uid: md.uid(),
            gid: md.gid(),
            mode: md.mode(),
            atime: md.atime(),
            atime_nsec: md.atime_nsec(),
            mtime: md.mtime(),
            mtime_nsec: md.mtime_nsec(),
            size: md.len(),
        })
    }

    /// Restore ownership and permission bits onto `dst`.
    pub fn apply_ownership(&self, dst: &Path) {
        if let Err(errno) = chown(dst, Some(Uid::from_raw(self.uid)), Some(Gid::from_raw(self.gid)))
        {
            warn!(path = %dst.display(), %errno, "chown failed");
        }
        let perms = fs::Permissions::from_mode(self.mode & !libc::S_IFMT);
        if let Err(err) = fs::set_permissions(dst, perms) {
            warn!(path = %dst.display(), error = %err, "chmod failed");
        }
    }

    /// Restore access and modify times onto `dst` (microsecond
    /// resolution).
    pub fn apply_times(&self, dst: &Path) {
        let atime = TimeVal::new(self.atime, self.atime_nsec / 1000);
        let mtime = TimeVal::new(self.mtime, self.mtime_nsec / 1000);
        if let Err(errno) = utimes(dst, &atime, &mtime) {
            warn!(path = %dst.display(), %errno, "utimes failed");
        }
    }
}
