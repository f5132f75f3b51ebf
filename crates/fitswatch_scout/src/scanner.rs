//! Filesystem scanner producing inventory snapshots
//!
//! Walks a watched folder recursively and records every file whose name
//! matches the configured pattern. Traversal is sequential and sorted by file
//! name so two scans of an unchanged tree yield identical lists.
//!
//! Only a failure on the watched folder itself fails the scan. An entry below
//! it that cannot be read (dangling link, file removed mid-walk, unreadable
//! subdirectory) is logged and left out.

use crate::error::Result;
use crate::patterns::build_name_matcher;
use crate::scan_path::validate_scan_path;
use crate::types::Snapshot;
use chrono::{DateTime, Utc};
use globset::GlobMatcher;
use std::fs::Metadata;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Scan `folder` for files matching `name_pattern`.
pub fn scan(folder: &Path, name_pattern: &str) -> Result<Vec<Snapshot>> {
    Scanner::new(name_pattern)?.scan(folder)
}

/// Reusable scanner holding a compiled name matcher.
#[derive(Debug, Clone)]
pub struct Scanner {
    matcher: GlobMatcher,
}

impl Scanner {
    pub fn new(name_pattern: &str) -> Result<Self> {
        Ok(Self {
            matcher: build_name_matcher(name_pattern)?,
        })
    }

    pub fn scan(&self, folder: &Path) -> Result<Vec<Snapshot>> {
        validate_scan_path(folder)?;

        let mut snapshots = Vec::new();
        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    warn!(folder = %folder.display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            if !self.matcher.is_match(entry.file_name()) {
                continue;
            }

            match stat_snapshot(entry.path()) {
                Ok(Some(snapshot)) => snapshots.push(snapshot),
                Ok(None) => {}
                Err(err) => warn!(
                    file = %entry.path().display(),
                    error = %err,
                    "Skipping file that cannot be stat'ed"
                ),
            }
        }

        debug!(
            folder = %folder.display(),
            files = snapshots.len(),
            "Scanned watched folder"
        );
        Ok(snapshots)
    }
}

/// Follow symlinks so a linked file reports its target's timestamps.
/// Returns `None` for a link that resolves to a directory.
fn stat_snapshot(path: &Path) -> std::io::Result<Option<Snapshot>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        return Ok(None);
    }
    Ok(Some(Snapshot::new(
        path,
        created_at(&metadata)?,
        modified_at(&metadata)?,
    )))
}

#[cfg(unix)]
fn created_at(metadata: &Metadata) -> std::io::Result<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;
    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(metadata.ctime(), nanos).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "ctime out of range")
    })
}

#[cfg(not(unix))]
fn created_at(metadata: &Metadata) -> std::io::Result<DateTime<Utc>> {
    metadata.created().map(DateTime::<Utc>::from)
}

fn modified_at(metadata: &Metadata) -> std::io::Result<DateTime<Utc>> {
    metadata.modified().map(DateTime::<Utc>::from)
}
