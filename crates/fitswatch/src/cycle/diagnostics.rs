//! Diagnostics sink for the cycle
//!
//! The controller reports each decision as a [`CycleEvent`]. Production
//! forwards them to `tracing`; tests capture them in memory.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    InventoryLoaded { folders: usize, files: usize },
    Bootstrapped { folders: usize, files: usize },
    /// Configured folder absent from the loaded inventory
    FolderAdded { folder: PathBuf },
    FolderUnreadable { folder: PathBuf, reason: String },
    /// Folder skipped this cycle, stored entry untouched
    FolderFailed { folder: PathBuf, reason: String },
    ChangesFound {
        folder: PathBuf,
        new: usize,
        modified: usize,
        deleted: usize,
    },
    FileVanished { file: PathBuf },
    ToolError { file: PathBuf, message: String },
    ReportMissing { file: PathBuf, expected: PathBuf },
    Malfunction {
        folder: PathBuf,
        file: PathBuf,
        line_count: usize,
    },
    FileChecked {
        file: PathBuf,
        invalid_count: usize,
        line_count: usize,
    },
    OwnersNotified { folder: PathBuf, owners: usize },
    NotificationFailed { subject: String, reason: String },
    InventorySaved { location: String },
}

pub trait Diagnostics {
    fn record(&self, event: CycleEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: CycleEvent) {
        match event {
            CycleEvent::InventoryLoaded { folders, files } => {
                info!(folders, files, "Loaded inventory")
            }
            CycleEvent::Bootstrapped { folders, files } => {
                info!(folders, files, "No inventory found, created a fresh one")
            }
            CycleEvent::FolderAdded { folder } => warn!(
                folder = %folder.display(),
                "New folder has no inventory entry; all its files count as new"
            ),
            CycleEvent::FolderUnreadable { folder, reason } => warn!(
                folder = %folder.display(),
                %reason,
                "Cannot scan folder, treating it as empty"
            ),
            CycleEvent::FolderFailed { folder, reason } => {
                error!(folder = %folder.display(), %reason, "Skipping folder")
            }
            CycleEvent::ChangesFound {
                folder,
                new,
                modified,
                deleted,
            } => info!(
                folder = %folder.display(),
                new,
                modified,
                deleted,
                "Found {new} new and {modified} modified file(s)"
            ),
            CycleEvent::FileVanished { file } => {
                warn!(file = %file.display(), "File disappeared before it could be checked")
            }
            CycleEvent::ToolError { file, message } => {
                error!(file = %file.display(), %message, "Checker failed")
            }
            CycleEvent::ReportMissing { file, expected } => warn!(
                file = %file.display(),
                expected = %expected.display(),
                "Could not find checker report"
            ),
            CycleEvent::Malfunction {
                folder,
                file,
                line_count,
            } => error!(
                folder = %folder.display(),
                file = %file.display(),
                line_count,
                "Checker report too short, aborting folder"
            ),
            CycleEvent::FileChecked {
                file,
                invalid_count,
                line_count,
            } => info!(
                file = %file.display(),
                invalid_count,
                line_count,
                "Checker found {invalid_count} marker(s)"
            ),
            CycleEvent::OwnersNotified { folder, owners } => {
                info!(folder = %folder.display(), owners, "Owners notified")
            }
            CycleEvent::NotificationFailed { subject, reason } => {
                error!(%subject, %reason, "Failed to send notification")
            }
            CycleEvent::InventorySaved { location } => info!(%location, "Saved inventory"),
        }
    }
}

/// Keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    events: Mutex<Vec<CycleEvent>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CycleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn record(&self, event: CycleEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
