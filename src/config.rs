//! Configuration for the tiering engine.
//!
//! The engine consumes a fully parsed [`EngineConfig`]: a log level and
//! an ordered list of [`TierSpec`]s, fastest pool first. How the file is
//! sourced is the caller's concern; [`EngineConfig::load_or_init`]
//! mirrors the traditional behavior of generating a stub on first run.

use crate::error::{Result, SedimentError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;

/// One storage pool in the vertical order. Index 0 in
/// [`EngineConfig::tiers`] is the fastest ("top") tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Human label, used in logs.
    pub id: String,
    /// Absolute path to the pool root. Expected to be the mount root of
    /// a filesystem distinct from every other tier.
    pub dir: PathBuf,
    /// Maximum percentage of the tier's filesystem the engine may fill
    /// with tiered data in one pass.
    pub watermark_pct: u8,
}

/// Verbosity of pass logging.
///
/// Maps onto the three event levels the engine emits: errors only,
/// pass-level progress, and per-file detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Errors only.
    Silent,
    /// Pass start/end and failures.
    #[default]
    Normal,
    /// Per-file copy intent, digests, ranked file dump.
    Debug,
}

impl LogLevel {
    /// The tracing filter equivalent of this level.
    pub fn tracing_filter(self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Normal => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Full configuration for a tiering pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pass logging verbosity.
    #[serde(default)]
    pub log_level: LogLevel,
    /// Ordered tier list, fastest first.
    pub tiers: Vec<TierSpec>,
}

/// Stub configuration written on first run. The operator must fill in
/// the tier directories before a pass will validate.
const STUB_CONFIG: &str = r#"{
  "log_level": "normal",
  "tiers": [
    { "id": "tier 1", "dir": "", "watermark_pct": 80 },
    { "id": "tier 2", "dir": "", "watermark_pct": 80 }
  ]
}
"#;

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SedimentError::InvalidConfig {
            field: path.display().to_string(),
            reason: format!("failed to read config file: {}", e),
        })?;

        let config: Self =
            serde_json::from_str(&content).map_err(|e| SedimentError::InvalidConfig {
                field: path.display().to_string(),
                reason: format!("failed to parse config: {}", e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration, generating a stub file first if none exists.
    ///
    /// A freshly generated stub has empty tier directories and will fail
    /// validation with a message pointing at the field to fill in.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, STUB_CONFIG)?;
            info!(path = %path.display(), "Generated stub configuration");
        }
        Self::from_file(path)
    }

    /// Build a configuration from an ordered tier list with the default
    /// log level.
    pub fn with_tiers(tiers: Vec<TierSpec>) -> Self {
        Self {
            log_level: LogLevel::default(),
            tiers,
        }
    }

    /// Validate the configuration.
    ///
    /// Requires at least two tiers, an existing absolute directory for
    /// each, and watermarks within [0, 100].
    pub fn validate(&self) -> Result<()> {
        if self.tiers.len() < 2 {
            return Err(SedimentError::InvalidConfig {
                field: "tiers".to_string(),
                reason: "at least two tiers are required".to_string(),
            });
        }

        for tier in &self.tiers {
            if tier.watermark_pct > 100 {
                return Err(SedimentError::InvalidConfig {
                    field: format!("tiers.{}.watermark_pct", tier.id),
                    reason: format!("{} is not in [0, 100]", tier.watermark_pct),
                });
            }
            if !tier.dir.is_absolute() {
                return Err(SedimentError::InvalidConfig {
                    field: format!("tiers.{}.dir", tier.id),
                    reason: format!("{:?} is not an absolute path", tier.dir),
                });
            }
            if !tier.dir.is_dir() {
                return Err(SedimentError::InvalidConfig {
                    field: format!("tiers.{}.dir", tier.id),
                    reason: format!("{:?} is not an existing directory", tier.dir),
                });
            }
        }

        Ok(())
    }
}
