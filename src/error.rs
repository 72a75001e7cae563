//! Error types for the sediment tiering engine.
//!
//! This module provides a unified error type [`SedimentError`] for all
//! tiering operations, along with a convenient [`Result`] type alias.
//!
//! Per-file failures during a pass (`CopyIo`, `VerifyMismatch`,
//! `DestinationExists`, `SymlinkInstall`) abort only that file's move;
//! the engine logs them and continues. `InvalidConfig` and
//! `StatvfsFailed` reject or abort the whole pass.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tiering operations.
#[derive(Error, Debug)]
pub enum SedimentError {
    /// Configuration rejected before the pass started.
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// stat/readdir failure while crawling; the entry is skipped.
    #[error("Crawl failed on {path}: {source}")]
    CrawlIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// statvfs failure on a tier root; the tier budget is indeterminate
    /// and the pass is aborted.
    #[error("statvfs failed on {path}: {errno}")]
    StatvfsFailed {
        path: PathBuf,
        errno: nix::errno::Errno,
    },

    /// Copy failed mid-stream. The source is left intact and any
    /// partial destination is removed.
    #[error("Copy failed from {from} to {to}: {source}")]
    CopyIo {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source and destination digests differ after a copy. Both files
    /// are left in place for inspection; the source is never deleted.
    #[error("Hash mismatch after copying {path}: source {source_hash:#018x}, destination {dest_hash:#018x}")]
    VerifyMismatch {
        path: PathBuf,
        source_hash: u64,
        dest_hash: u64,
    },

    /// Could not create or replace a symlink shim.
    #[error("Symlink install failed at {path}: {source}")]
    SymlinkInstall {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A regular file already occupies the destination path. The move
    /// is skipped rather than overwriting.
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SedimentError {
    /// Check whether the error aborts the whole pass rather than a
    /// single file's move.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SedimentError::InvalidConfig { .. } | SedimentError::StatvfsFailed { .. }
        )
    }
}

/// Result type alias for tiering operations.
pub type Result<T> = std::result::Result<T, SedimentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let err = SedimentError::InvalidConfig {
            field: "tiers".to_string(),
            reason: "at least two tiers are required".to_string(),
        };
        assert!(err.is_fatal());

        let err = SedimentError::DestinationExists(PathBuf::from("/slow/a"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_verify_mismatch_display_includes_hashes() {
        let err = SedimentError::VerifyMismatch {
            path: PathBuf::from("/fast/a"),
            source_hash: 0xdead_beef,
            dest_hash: 0xfeed_face,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x00000000deadbeef"));
        assert!(msg.contains("0x00000000feedface"));
    }
}
