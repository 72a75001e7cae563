// Per-file relocation with content verification and shim repair.

use crate::config::TierSpec;
use crate::error::{Result, SedimentError};
use crate::hash::hash_file;
use crate::types::FileRecord;
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of relocating a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Bytes were copied, verified, and the source was removed.
    Moved,
    /// Source and destination coincide; nothing was copied.
    InPlace,
}

/// Physically relocates enrolled files and maintains the top-tier
/// symlink shims.
///
/// Destructive steps are gated on the preceding verification: the
/// source is deleted only after source and destination digests match,
/// and the shim is only rewritten after the copy has committed. At any
/// interruption point the worst outcome is a duplicated file, never a
/// lost one.
#[derive(Debug)]
pub struct Mover {
    top_dir: PathBuf,
}

impl Mover {
    pub fn new(top_dir: &Path) -> Self {
        Self {
            top_dir: top_dir.to_path_buf(),
        }
    }

    /// Move `record` into `dest` and repair the shim.
    ///
    /// For a non-top destination the shim at the top tier is replaced
    /// to point at the new location. For the top tier the previous shim
    /// occupies the destination itself and is removed before the copy.
    pub fn relocate(&self, record: &mut FileRecord, dest: &TierSpec) -> Result<MoveOutcome> {
        let new_path = dest.dir.join(&record.rel_key);
        let symlink_path = self.top_dir.join(&record.rel_key);
        record.new_path = Some(new_path.clone());
        record.symlink_path = Some(symlink_path.clone());

        let outcome = self.copy_with_verify(record, &new_path)?;

        if new_path != symlink_path {
            self.install_shim(&symlink_path, &new_path)?;
        }
        Ok(outcome)
    }

    /// Copy `record.old_path` to `new_path`, verify by digest, and
    /// remove the source.
    ///
    /// Access and modify times are restored on the destination whatever
    /// the hash outcome. On a digest mismatch both files are left in
    /// place for inspection.
    fn copy_with_verify(&self, record: &FileRecord, new_path: &Path) -> Result<MoveOutcome> {
        if record.old_path == *new_path {
            return Ok(MoveOutcome::InPlace);
        }

        match fs::symlink_metadata(new_path) {
            Ok(md) if md.file_type().is_symlink() => {
                // previous shim occupies the destination
                fs::remove_file(new_path)?;
            }
            Ok(_) => {
                return Err(SedimentError::DestinationExists(new_path.to_path_buf()));
            }
            Err(_) => {}
        }

        if let Some(parent) = new_path.parent() {
            if !parent.is_dir() {
                fs::create_dir_all(parent)?;
            }
        }

        debug!(from = %record.old_path.display(), to = %new_path.display(), "Copying");
        if let Err(source) = fs::copy(&record.old_path, new_path) {
            // leave the source intact, drop any partial destination
            let _ = fs::remove_file(new_path);
            return Err(SedimentError::CopyIo {
                from: record.old_path.clone(),
                to: new_path.to_path_buf(),
                source,
            });
        }

        record.meta.apply_ownership(new_path);

        let digests = verify_copy(&record.old_path, new_path);
        record.meta.apply_times(new_path);

        let (source_hash, dest_hash) = digests?;
        if source_hash != dest_hash {
            return Err(SedimentError::VerifyMismatch {
                path: record.old_path.clone(),
                source_hash,
                dest_hash,
            });
        }

        fs::remove_file(&record.old_path)?;
        Ok(MoveOutcome::Moved)
    }

    /// Replace the shim at `symlink_path` with one pointing at `target`.
    ///
    /// An existing non-symlink at the shim location is never removed;
    /// that is user data, and the install fails instead.
    fn install_shim(&self, symlink_path: &Path, target: &Path) -> Result<()> {
        let shim_err = |source: io::Error| SedimentError::SymlinkInstall {
            path: symlink_path.to_path_buf(),
            source,
        };

        match fs::symlink_metadata(symlink_path) {
            Ok(md) if md.file_type().is_symlink() => {
                fs::remove_file(symlink_path).map_err(shim_err)?;
            }
            Ok(_) => {
                return Err(shim_err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "refusing to replace a non-symlink",
                )));
            }
            Err(_) => {}
        }

        if let Some(parent) = symlink_path.parent() {
            if !parent.is_dir() {
                fs::create_dir_all(parent).map_err(shim_err)?;
            }
        }

        symlink(target, symlink_path).map_err(shim_err)
    }
}

/// Digest both ends of a copy; Ok carries (source, destination).
fn verify_copy(src: &Path, dst: &Path) -> Result<(u64, u64)> {
    let source_hash = hash_file(src)?;
    let dest_hash = hash_file(dst)?;
    debug!(
        src = %format!("{source_hash:#018x}"),
        dst = %format!("{dest_hash:#018x}"),
        "Copy digests"
    );
    Ok((source_hash, dest_hash))
}
