//! Filesystem enumeration.
//!
//! Pure read of filesystem state: nothing here touches the catalog. A missing
//! root yields a configuration error that [`scan_roots`] logs and skips; an
//! unreadable directory or file is skipped with a warning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use vlib_common::paths::has_extension;
use vlib_common::{Error, Result};
use walkdir::WalkDir;

/// A media file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Last modification time, truncated to milliseconds (the catalog's precision).
    pub modified_at: DateTime<Utc>,
}

/// Enumerate media files under every root.
///
/// Files reachable from more than one root are reported once. The result is
/// sorted by path.
pub fn scan_roots(roots: &[PathBuf], extensions: &[String]) -> Vec<ScannedFile> {
    let mut found: BTreeMap<PathBuf, ScannedFile> = BTreeMap::new();

    for root in roots {
        match scan_root(root, extensions) {
            Ok(files) => {
                for file in files {
                    found.insert(file.path.clone(), file);
                }
            }
            Err(e) => warn!(root = %root.display(), error = %e, "Skipping library root"),
        }
    }

    found.into_values().collect()
}

/// Enumerate media files under a single root.
///
/// Fails only when the root itself is missing or not a directory.
pub fn scan_root(root: &Path, extensions: &[String]) -> Result<Vec<ScannedFile>> {
    let root = std::fs::canonicalize(root)
        .map_err(|e| Error::configuration(format!("{}: {}", root.display(), e)))?;
    if !root.is_dir() {
        return Err(Error::configuration(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    info!("Scanning directory: {:?}", root);
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path during scan");
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to stat file, skipping");
                continue;
            }
        };

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        debug!(path = %entry.path().display(), size = metadata.len(), "Found media file");

        files.push(ScannedFile {
            path: entry.into_path(),
            size_bytes: metadata.len(),
            modified_at: truncate_to_millis(modified),
        });
    }

    info!(root = %root.display(), files = files.len(), "Directory scan complete");
    Ok(files)
}

fn truncate_to_millis(time: SystemTime) -> DateTime<Utc> {
    let time: DateTime<Utc> = time.into();
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap_or_default()
}
