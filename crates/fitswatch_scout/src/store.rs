//! Inventory persistence
//!
//! The inventory is a single YAML document mapping folder path to its list of
//! `{path, created_at, modified_at}` records. Timestamps are written as
//! RFC 3339 strings with full nanosecond precision so a save/load round trip
//! is lossless.

use crate::error::Result;
use crate::types::Inventory;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use tracing::debug;

/// Load/save abstraction over the persisted inventory.
pub trait InventoryStore {
    /// `Ok(None)` means no inventory has ever been saved.
    fn load(&self) -> Result<Option<Inventory>>;

    fn save(&self, inventory: &Inventory) -> Result<()>;

    /// Human-readable location for log lines.
    fn location(&self) -> String;
}

/// YAML file on local disk.
#[derive(Debug, Clone)]
pub struct YamlInventoryStore {
    path: PathBuf,
}

impl YamlInventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InventoryStore for YamlInventoryStore {
    fn load(&self) -> Result<Option<Inventory>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Some(Inventory::new()));
        }
        // A document holding only `null` is an empty inventory
        let inventory: Option<Inventory> = serde_yaml::from_str(&content)?;
        Ok(Some(inventory.unwrap_or_default()))
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_yaml::to_writer(&mut tmp, inventory)?;
        tmp.flush()?;
        tmp.persist(&self.path)?;

        debug!(path = %self.path.display(), "Wrote inventory");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store for tests and staging runs.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    inventory: Mutex<Option<Inventory>>,
    saves: Mutex<usize>,
}

impl MemoryInventoryStore {
    /// Empty store: the first run bootstraps.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(inventory: Inventory) -> Self {
        Self {
            inventory: Mutex::new(Some(inventory)),
            saves: Mutex::new(0),
        }
    }

    /// Currently stored inventory, if any.
    pub fn current(&self) -> Option<Inventory> {
        self.inventory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InventoryStore for MemoryInventoryStore {
    fn load(&self) -> Result<Option<Inventory>> {
        Ok(self.current())
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        *self
            .inventory
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(inventory.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use crate::types::Snapshot;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.replace(
            Path::new("/drop/WG11/Nice"),
            vec![
                Snapshot::new(
                    "/drop/WG11/Nice/a.fits",
                    Utc.timestamp_opt(1_400_000_000, 123_456_789).unwrap(),
                    Utc.timestamp_opt(1_400_000_100, 987_654_321).unwrap(),
                ),
                Snapshot::new(
                    "/drop/WG11/Nice/sub/B.FITS",
                    Utc.timestamp_opt(1_400_000_200, 1).unwrap(),
                    Utc.timestamp_opt(1_400_000_300, 0).unwrap(),
                ),
            ],
        );
        inventory.ensure_folder(Path::new("/drop/WG10/Empty"));
        inventory
    }

    #[test]
    fn missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let store = YamlInventoryStore::new(temp.path().join("inventory.yaml"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn round_trip_preserves_nanoseconds() {
        let temp = TempDir::new().unwrap();
        let store = YamlInventoryStore::new(temp.path().join("state/inventory.yaml"));
        let inventory = sample_inventory();

        store.save(&inventory).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, inventory);
    }

    #[test]
    fn empty_or_null_document_is_empty_inventory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.yaml");
        let store = YamlInventoryStore::new(&path);

        std::fs::write(&path, "").unwrap();
        assert!(store.load().unwrap().unwrap().is_empty());

        std::fs::write(&path, "null\n").unwrap();
        assert!(store.load().unwrap().unwrap().is_empty());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.yaml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();

        let err = YamlInventoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ScoutError::Format(_)));
    }

    #[test]
    fn memory_store_counts_saves() {
        let store = MemoryInventoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample_inventory()).unwrap();
        store.save(&sample_inventory()).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.current().unwrap(), sample_inventory());
    }
}
