// Recursive tier inventory crawler.

use crate::config::TierSpec;
use crate::error::SedimentError;
use crate::meta::FileMeta;
use crate::types::FileRecord;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Editor and lock artifacts that are never enrolled. The trailing
/// alternative is a prefix match: any name starting with `~$`.
const EXCLUDE_PATTERN: &str = r"^\..*\.swp$|^\.~lock\..*#$|^~\$";

/// Walks tier directories and produces one [`FileRecord`] per regular,
/// non-symlink file.
///
/// Symlinks in the top tier are shims pointing at files already
/// enrolled under their real tier; the crawler neither follows nor
/// counts them. Traversal is depth-first with directory entries sorted
/// by name, so the inventory is deterministic for a given filesystem
/// state.
pub struct Crawler {
    exclude: Regex,
}

impl Crawler {
    pub fn new() -> Self {
        Self {
            exclude: Regex::new(EXCLUDE_PATTERN).expect("exclusion pattern is valid"),
        }
    }

    /// Crawl one tier, appending records to `out`.
    ///
    /// Per-entry stat/readdir failures are logged and skipped; the
    /// crawl continues with the rest of the tree.
    pub fn crawl_tier(&self, tier_index: usize, tier: &TierSpec, out: &mut Vec<FileRecord>) {
        debug!(tier = %tier.id, dir = %tier.dir.display(), "Gathering file list");
        self.walk(tier_index, tier, &tier.dir, out);
    }

    fn walk(&self, tier_index: usize, tier: &TierSpec, dir: &Path, out: &mut Vec<FileRecord>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                let err = SedimentError::CrawlIo {
                    path: dir.to_path_buf(),
                    source,
                };
                warn!(error = %err, "Skipping unreadable directory");
                return;
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|entry| match entry {
                Ok(e) => Some(e.path()),
                Err(source) => {
                    let err = SedimentError::CrawlIo {
                        path: dir.to_path_buf(),
                        source,
                    };
                    warn!(error = %err, "Skipping unreadable entry");
                    None
                }
            })
            .collect();
        paths.sort();

        for path in paths {
            let file_type = match fs::symlink_metadata(&path) {
                Ok(md) => md.file_type(),
                Err(source) => {
                    let err = SedimentError::CrawlIo {
                        path: path.clone(),
                        source,
                    };
                    warn!(error = %err, "Skipping unstatable entry");
                    continue;
                }
            };

            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                self.walk(tier_index, tier, &path, out);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if self.exclude.is_match(name) {
                debug!(path = %path.display(), "Skipping excluded name");
                continue;
            }

            let rel_key = match path.strip_prefix(&tier.dir) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => {
                    warn!(path = %path.display(), tier = %tier.id, "Entry escapes tier root, skipping");
                    continue;
                }
            };

            match FileMeta::probe(&path) {
                Ok(meta) => out.push(FileRecord::new(path, rel_key, tier_index, meta)),
                Err(err) => warn!(path = %path.display(), error = %err, "stat failed, skipping"),
            }
        }
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tier_spec(dir: &Path) -> TierSpec {
        TierSpec {
            id: "fast".to_string(),
            dir: dir.to_path_buf(),
            watermark_pct: 80,
        }
    }

    fn crawl(dir: &Path) -> Vec<FileRecord> {
        let mut out = Vec::new();
        Crawler::new().crawl_tier(0, &tier_spec(dir), &mut out);
        out
    }

    #[test]
    fn test_enrolls_regular_files_with_metadata() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("top.txt"), b"12345").unwrap();
        fs::write(tmp.path().join("a/b/deep.txt"), b"123").unwrap();

        let records = crawl(tmp.path());
        assert_eq!(records.len(), 2);

        let deep = records
            .iter()
            .find(|r| r.rel_key == PathBuf::from("a/b/deep.txt"))
            .expect("nested file enrolled");
        assert_eq!(deep.size(), 3);
        assert_eq!(deep.old_tier, 0);
        assert_eq!(deep.old_path, tmp.path().join("a/b/deep.txt"));
    }

    #[test]
    fn test_skips_excluded_names() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".foo.swp"), b"x").unwrap();
        fs::write(tmp.path().join(".~lock.doc#"), b"x").unwrap();
        fs::write(tmp.path().join("~$doc"), b"x").unwrap();
        fs::write(tmp.path().join("kept.swp.txt"), b"x").unwrap();
        fs::write(tmp.path().join("kept~$middle"), b"x").unwrap();

        let records = crawl(tmp.path());
        let keys: Vec<_> = records.iter().map(|r| r.rel_key.clone()).collect();
        assert_eq!(
            keys,
            vec![PathBuf::from("kept.swp.txt"), PathBuf::from("kept~$middle")]
        );
    }

    #[test]
    fn test_skips_symlinks() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("real"), b"data").unwrap();
        symlink(tmp.path().join("real"), tmp.path().join("shim")).unwrap();
        symlink("/nonexistent/target", tmp.path().join("dangling")).unwrap();

        let records = crawl(tmp.path());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rel_key, PathBuf::from("real"));
    }

    #[test]
    fn test_deterministic_sorted_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let first: Vec<_> = crawl(tmp.path()).iter().map(|r| r.rel_key.clone()).collect();
        let second: Vec<_> = crawl(tmp.path()).iter().map(|r| r.rel_key.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                PathBuf::from("alpha"),
                PathBuf::from("mid"),
                PathBuf::from("zeta")
            ]
        );
    }

    #[test]
    fn test_missing_root_yields_empty_inventory() {
        let tmp = TempDir::new().unwrap();
        let records = crawl(&tmp.path().join("nope"));
        assert!(records.is_empty());
    }
}
