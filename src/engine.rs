// Tiering engine - composes one crawl/rank/simulate/move pass.

use crate::config::EngineConfig;
use crate::crawl::Crawler;
use crate::error::{Result, SedimentError};
use crate::fsstat::{CapacityProbe, StatvfsProbe};
use crate::mover::{MoveOutcome, Mover};
use crate::placement::{simulate, sort_by_priority, PriorityPolicy, RecencyPolicy};
use crate::types::FileRecord;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info};

/// Counters for one completed tiering pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassStats {
    /// Regular files found across all tier roots.
    pub files_crawled: u64,
    /// Files assigned a destination by the simulator.
    pub files_enrolled: u64,
    /// Files physically copied, verified, and unlinked at the source.
    pub files_moved: u64,
    /// Bytes carried by those moves.
    pub bytes_moved: u64,
    /// Enrolled files whose destination equalled their current path.
    pub already_placed: u64,
    /// Digest mismatches; source and destination both left in place.
    pub verify_failures: u64,
    /// Copy or unlink failures; source left intact.
    pub copy_failures: u64,
    /// Moves skipped because a regular file occupied the destination.
    pub collisions: u64,
    /// Shim create/replace failures.
    pub symlink_failures: u64,
    /// Files left unplaced after the slowest budget filled.
    pub left_unenrolled: u64,
    /// Wall-clock duration of the pass.
    pub duration_ms: u64,
}

/// Runs tiering passes over an ordered set of storage pools.
///
/// The engine is the only component that sees the tier list as a
/// whole; it owns the configuration and the pass-local file list as
/// plain values and hands each component only what it needs. A pass is
/// one-shot and keeps no state between invocations.
pub struct TieringEngine {
    config: EngineConfig,
    probe: Box<dyn CapacityProbe>,
    policy: Box<dyn PriorityPolicy>,
}

impl TieringEngine {
    /// Engine with the statvfs-backed probe and the recency priority
    /// policy.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            probe: Box::new(StatvfsProbe),
            policy: Box::new(RecencyPolicy),
        }
    }

    /// Replace the capacity probe.
    pub fn with_probe(mut self, probe: Box<dyn CapacityProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the priority policy.
    pub fn with_policy(mut self, policy: Box<dyn PriorityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one pass: crawl every tier, rank globally, simulate
    /// placement against watermark budgets, then move tiers in reverse
    /// order, slowest first.
    ///
    /// Per-file failures are logged and counted; only configuration
    /// and statvfs errors abort the pass.
    pub fn run_pass(&self) -> Result<PassStats> {
        self.config.validate()?;
        let start = Instant::now();
        let tiers = &self.config.tiers;
        let mut stats = PassStats::default();
        info!(tiers = tiers.len(), "Starting tiering pass");

        let crawler = Crawler::new();
        let mut files: Vec<FileRecord> = Vec::new();
        for (index, tier) in tiers.iter().enumerate() {
            crawler.crawl_tier(index, tier, &mut files);
        }
        stats.files_crawled = files.len() as u64;

        for file in &mut files {
            file.priority = self.policy.priority(file);
        }
        sort_by_priority(&mut files);
        self.dump_ranked(&files);

        let mut budgets = Vec::with_capacity(tiers.len());
        for tier in tiers {
            let budget = self.probe.capacity_bytes(&tier.dir, tier.watermark_pct)?;
            let usage = self.probe.usage_pct(&tier.dir)?;
            debug!(tier = %tier.id, usage_pct = usage, budget_bytes = budget, "Tier capacity");
            budgets.push(budget);
        }

        let plan = simulate(&files, &budgets);
        stats.files_enrolled = plan.enrolled as u64;
        stats.left_unenrolled = (files.len() - plan.enrolled) as u64;

        // reverse order: lower tiers have the most free capacity, so
        // filling them first keeps pressure off the small top tier
        let mover = Mover::new(&tiers[0].dir);
        for tier_index in (0..tiers.len()).rev() {
            for &file_index in &plan.incoming[tier_index] {
                let record = &mut files[file_index];
                let size = record.size();
                match mover.relocate(record, &tiers[tier_index]) {
                    Ok(MoveOutcome::Moved) => {
                        stats.files_moved += 1;
                        stats.bytes_moved += size;
                    }
                    Ok(MoveOutcome::InPlace) => stats.already_placed += 1,
                    Err(err) => note_failure(&mut stats, err),
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            crawled = stats.files_crawled,
            moved = stats.files_moved,
            bytes = stats.bytes_moved,
            verify_failures = stats.verify_failures,
            duration_ms = stats.duration_ms,
            "Tiering pass complete"
        );
        Ok(stats)
    }

    fn dump_ranked(&self, files: &[FileRecord]) {
        for file in files {
            debug!(
                priority = file.priority,
                atime = file.meta.atime,
                path = %file.old_path.display(),
                "Ranked file"
            );
        }
    }
}

fn note_failure(stats: &mut PassStats, err: SedimentError) {
    match &err {
        SedimentError::VerifyMismatch { .. } => stats.verify_failures += 1,
        SedimentError::DestinationExists(_) => stats.collisions += 1,
        SedimentError::SymlinkInstall { .. } => stats.symlink_failures += 1,
        _ => stats.copy_failures += 1,
    }
    error!(error = %err, "File move failed");
}
