//! Common test utilities for integration tests.

use sediment::config::{EngineConfig, TierSpec};
use sediment::error::Result;
use sediment::fsstat::CapacityProbe;
use sediment::meta::FileMeta;
use sediment::TieringEngine;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An ordered tier layout rooted in one temporary directory. Index 0
/// is the fastest tier.
pub struct TierFixture {
    pub temp_dir: TempDir,
    pub roots: Vec<PathBuf>,
}

impl TierFixture {
    pub fn new(names: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let roots = names
            .iter()
            .map(|name| {
                let root = temp_dir.path().join(name);
                fs::create_dir_all(&root).expect("Failed to create tier root");
                root
            })
            .collect();
        Self { temp_dir, roots }
    }

    pub fn root(&self, index: usize) -> &Path {
        &self.roots[index]
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig::with_tiers(
            self.roots
                .iter()
                .enumerate()
                .map(|(index, root)| TierSpec {
                    id: format!("tier {}", index + 1),
                    dir: root.clone(),
                    watermark_pct: 80,
                })
                .collect(),
        )
    }

    /// Engine over this layout with pinned byte budgets, one per tier.
    pub fn engine(&self, budgets: &[u64]) -> TieringEngine {
        let probe = FixedProbe {
            budgets: self
                .roots
                .iter()
                .cloned()
                .zip(budgets.iter().copied())
                .collect(),
        };
        TieringEngine::new(self.config()).with_probe(Box::new(probe))
    }

    /// Write a file under a tier root with fixed access/modify times.
    pub fn write_file(&self, tier: usize, rel: &str, len: usize, atime: i64) -> PathBuf {
        let path = self.roots[tier].join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, vec![b'x'; len]).expect("Failed to write file");
        set_times(&path, atime, atime);
        path
    }
}

/// Pin access and modify times on a path.
pub fn set_times(path: &Path, atime: i64, mtime: i64) {
    let meta = FileMeta {
        atime,
        atime_nsec: 0,
        mtime,
        mtime_nsec: 0,
        ..FileMeta::probe(path).expect("Failed to probe path")
    };
    meta.apply_times(path);
}

/// Capacity probe with pinned per-tier byte budgets; directories not
/// listed get an unbounded budget.
pub struct FixedProbe {
    pub budgets: Vec<(PathBuf, u64)>,
}

impl CapacityProbe for FixedProbe {
    fn usage_pct(&self, _dir: &Path) -> Result<u64> {
        Ok(0)
    }

    fn capacity_bytes(&self, dir: &Path, _watermark_pct: u8) -> Result<u64> {
        Ok(self
            .budgets
            .iter()
            .find(|(d, _)| d == dir)
            .map(|(_, b)| *b)
            .unwrap_or(u64::MAX))
    }
}
