//! Filesystem capacity probing.
//!
//! Tier budgets are absolute byte counts derived from statvfs totals
//! and the configured watermark, not from free space: every crawled
//! file is re-enrolled each pass, so the whole budget is available to
//! the simulator.

use crate::error::{Result, SedimentError};
use nix::sys::statvfs::{statvfs, Statvfs};
use std::path::Path;

/// Capacity and usage reporting for the filesystem hosting a tier
/// directory. The engine takes this as a seam so capacity can be
/// metered differently (and pinned in tests).
pub trait CapacityProbe {
    /// Percentage of the filesystem already in use, floored.
    fn usage_pct(&self, dir: &Path) -> Result<u64>;

    /// Absolute byte budget a tier may hold during a pass:
    /// `total_bytes * watermark_pct / 100`.
    fn capacity_bytes(&self, dir: &Path, watermark_pct: u8) -> Result<u64>;
}

/// Production probe backed by statvfs(3).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsProbe;

fn stat_dir(dir: &Path) -> Result<Statvfs> {
    statvfs(dir).map_err(|errno| SedimentError::StatvfsFailed {
        path: dir.to_path_buf(),
        errno,
    })
}

impl CapacityProbe for StatvfsProbe {
    fn usage_pct(&self, dir: &Path) -> Result<u64> {
        let st = stat_dir(dir)?;
        let blocks = st.blocks() as u64;
        if blocks == 0 {
            return Ok(0);
        }
        Ok((blocks - st.blocks_free() as u64) * 100 / blocks)
    }

    fn capacity_bytes(&self, dir: &Path, watermark_pct: u8) -> Result<u64> {
        let st = stat_dir(dir)?;
        Ok((st.blocks() as u64) * (st.fragment_size() as u64) * (watermark_pct as u64) / 100)
    }
}
