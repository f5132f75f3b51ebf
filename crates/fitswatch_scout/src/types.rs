//! Core types for the Scout system
//!
//! A [`Snapshot`] is created fresh on every scan and never mutated; the next
//! scan's list supersedes it wholesale. The [`Inventory`] is the persisted
//! mapping from watched folder to its most recent accepted snapshot list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ============================================================================
// Snapshot
// ============================================================================

/// One file's identity and timestamps at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Absolute path, case preserved for display
    pub path: PathBuf,
    /// Creation (metadata change) instant
    pub created_at: DateTime<Utc>,
    /// Last write instant
    pub modified_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(
        path: impl Into<PathBuf>,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            created_at,
            modified_at,
        }
    }

    /// Identity key used when comparing scans.
    pub fn key(&self) -> String {
        fold_path(&self.path)
    }

    /// True if either timestamp moved forward relative to `previous`.
    pub fn is_newer_than(&self, previous: &Snapshot) -> bool {
        self.created_at > previous.created_at || self.modified_at > previous.modified_at
    }

    /// Path with the watched folder prefix stripped, for human-facing lists.
    pub fn display_relative_to(&self, root: &Path) -> String {
        self.path
            .strip_prefix(root)
            .unwrap_or(&self.path)
            .to_string_lossy()
            .into_owned()
    }
}

/// Case-fold a path into its comparison key.
pub fn fold_path(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

// ============================================================================
// Inventory
// ============================================================================

/// Watched folder path → snapshot list from its last accepted scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    folders: BTreeMap<String, Vec<Snapshot>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, folder: &Path) -> Option<&[Snapshot]> {
        self.folders
            .get(folder.to_string_lossy().as_ref())
            .map(Vec::as_slice)
    }

    pub fn contains(&self, folder: &Path) -> bool {
        self.folders.contains_key(folder.to_string_lossy().as_ref())
    }

    /// Replace a folder's snapshot list wholesale.
    pub fn replace(&mut self, folder: &Path, snapshots: Vec<Snapshot>) {
        self.folders
            .insert(folder.to_string_lossy().into_owned(), snapshots);
    }

    /// Insert an empty entry for `folder` if none exists. Returns true when added.
    pub fn ensure_folder(&mut self, folder: &Path) -> bool {
        let key = folder.to_string_lossy().into_owned();
        if self.folders.contains_key(&key) {
            return false;
        }
        self.folders.insert(key, Vec::new());
        true
    }

    /// Folders in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[Snapshot])> {
        self.folders
            .iter()
            .map(|(folder, snapshots)| (Path::new(folder.as_str()), snapshots.as_slice()))
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.folders.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn key_is_case_folded() {
        let a = Snapshot::new("/drop/WG11/Nice/A.FITS", at(1), at(1));
        let b = Snapshot::new("/drop/wg11/nice/a.fits", at(1), at(1));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.path, b.path);
    }

    #[test]
    fn newer_when_either_timestamp_advances() {
        let old = Snapshot::new("/d/a.fits", at(10), at(10));
        assert!(Snapshot::new("/d/a.fits", at(11), at(10)).is_newer_than(&old));
        assert!(Snapshot::new("/d/a.fits", at(10), at(11)).is_newer_than(&old));
        assert!(!Snapshot::new("/d/a.fits", at(10), at(10)).is_newer_than(&old));
        assert!(!Snapshot::new("/d/a.fits", at(9), at(9)).is_newer_than(&old));
    }

    #[test]
    fn relative_display_strips_folder() {
        let snap = Snapshot::new("/drop/Nice/sub/run1.fits", at(0), at(0));
        assert_eq!(
            snap.display_relative_to(Path::new("/drop/Nice")),
            Path::new("sub").join("run1.fits").to_string_lossy()
        );
        assert_eq!(
            snap.display_relative_to(Path::new("/elsewhere")),
            "/drop/Nice/sub/run1.fits"
        );
    }

    #[test]
    fn ensure_folder_only_adds_once() {
        let mut inventory = Inventory::new();
        let folder = Path::new("/drop/Nice");
        assert!(inventory.ensure_folder(folder));
        assert!(!inventory.ensure_folder(folder));
        inventory.replace(folder, vec![Snapshot::new("/drop/Nice/a.fits", at(1), at(2))]);
        assert!(!inventory.ensure_folder(folder));
        assert_eq!(inventory.folder_count(), 1);
        assert_eq!(inventory.file_count(), 1);
    }
}
