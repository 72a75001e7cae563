//! Sediment - watermark-driven file tiering across ordered storage pools.
//!
//! Sediment manages a vertically ordered set of directories ("tiers"),
//! each backed by distinct physical media of differing speed and cost,
//! and relocates regular files among them so the most valuable files
//! live on the fastest media while capacity bounds hold. A file that
//! sinks below the top tier stays reachable at its original path
//! through a symlink shim, keeping placement transparent to
//! applications.
//!
//! # Pass pipeline
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       TieringEngine                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  Crawler: per-tier inventory with ownership and times      │
//! ├────────────────────────────────────────────────────────────┤
//! │  Priority order: rank every file across the namespace      │
//! ├────────────────────────────────────────────────────────────┤
//! │  Placement: watermark byte budgets, top tier first         │
//! ├────────────────────────────────────────────────────────────┤
//! │  Mover: copy, verify by digest, unlink, install shim       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! A pass is one-shot and synchronous; the caller decides cadence and
//! must ensure only one pass runs at a time. Destructive steps are
//! gated on digest verification, so the worst outcome of an
//! interrupted pass is a duplicated file, never a lost one.
//!
//! # Quick start
//!
//! ```no_run
//! use sediment::{EngineConfig, TieringEngine};
//! use std::path::Path;
//!
//! fn main() -> sediment::Result<()> {
//!     let config = EngineConfig::load_or_init(Path::new("/etc/sediment.json"))?;
//!     sediment::init_tracing(config.log_level);
//!
//!     let stats = TieringEngine::new(config).run_pass()?;
//!     println!(
//!         "moved {} files ({} bytes)",
//!         stats.files_moved, stats.bytes_moved
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

pub mod crawl;
pub mod engine;
pub mod fsstat;
pub mod hash;
pub mod meta;
pub mod mover;
pub mod placement;

pub use config::{EngineConfig, LogLevel, TierSpec};
pub use engine::{PassStats, TieringEngine};
pub use error::{Result, SedimentError};
pub use types::FileRecord;

/// Install a global tracing subscriber honoring the configured level.
///
/// Callers embedding the engine in a larger process will usually
/// install their own subscriber instead; every event the engine emits
/// is at ERROR, INFO or DEBUG.
pub fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level.tracing_filter())
        .with_target(false)
        .init();
}
