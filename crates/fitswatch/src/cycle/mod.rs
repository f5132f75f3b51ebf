//! Cycle Controller
//!
//! One cycle per invocation. For each configured folder:
//!
//! ```text
//! SCANNING ─▶ DIFFING ─▶ VALIDATING(i) ─▶ DECIDING ─▶ PERSISTING ─▶ DONE
//!                 │             │ malfunction
//!                 │             └────────────▶ ABORTED (stored entry kept)
//!                 └─ case collision ─▶ FAILED (stored entry kept)
//! ```
//!
//! The stored snapshot for a folder is only replaced when validation finished
//! without a malfunction, so a broken checker never marks files as seen.
//! The whole inventory is saved once, after every folder was visited.

mod diagnostics;

pub use diagnostics::{CycleEvent, Diagnostics, MemoryDiagnostics, TracingDiagnostics};

use crate::checker::{Outcome, Validator};
use crate::config::{FolderConfig, WatchConfig};
use anyhow::{Context, Result};
use fitswatch_notify::templates::{folder_failure_alert, malfunction_alert, tool_error_alert};
use fitswatch_notify::{Composed, Contact, Notifier, OwnerReport};
use fitswatch_scout::{Inventory, InventoryDiff, InventoryStore, Scanner, Snapshot};
use std::path::{Path, PathBuf};
use tracing::info;

/// Terminal state of one folder's cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderState {
    /// Validation completed; stored snapshot replaced
    Done,
    /// Checker malfunctioned; stored snapshot kept
    Aborted,
    /// Folder could not be diffed; stored snapshot kept
    Failed,
}

/// What happened in one folder.
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub folder: PathBuf,
    pub state: FolderState,
    pub new_files: Vec<Snapshot>,
    pub modified_files: Vec<Snapshot>,
    pub invalid_count: usize,
    pub malfunction_detected: bool,
    /// Reports collected from completed checks, in validation order
    pub report_attachments: Vec<PathBuf>,
    pub owners_notified: bool,
}

impl CycleResult {
    fn new(folder: &Path) -> Self {
        Self {
            folder: folder.to_path_buf(),
            state: FolderState::Done,
            new_files: Vec::new(),
            modified_files: Vec::new(),
            invalid_count: 0,
            malfunction_detected: false,
            report_attachments: Vec::new(),
            owners_notified: false,
        }
    }

    pub fn updated_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// No inventory existed; folders were scanned and stored, nothing checked
    pub bootstrapped: bool,
    pub files_updated: usize,
    pub invalid_total: usize,
    pub malfunctions: usize,
    pub owner_reports: usize,
    pub results: Vec<CycleResult>,
}

impl RunSummary {
    fn absorb(&mut self, result: CycleResult) {
        self.files_updated += result.updated_count();
        self.invalid_total += result.invalid_count;
        if result.malfunction_detected {
            self.malfunctions += 1;
        }
        if result.owners_notified {
            self.owner_reports += 1;
        }
        self.results.push(result);
    }

    pub fn result_for(&self, folder: &Path) -> Option<&CycleResult> {
        self.results.iter().find(|result| result.folder == folder)
    }
}

pub struct CycleController<'a> {
    config: &'a WatchConfig,
    scanner: Scanner,
    validator: &'a dyn Validator,
    notifier: &'a Notifier,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> CycleController<'a> {
    pub fn new(
        config: &'a WatchConfig,
        validator: &'a dyn Validator,
        notifier: &'a Notifier,
        diagnostics: &'a dyn Diagnostics,
    ) -> Result<Self> {
        let scanner = Scanner::new(&config.name_pattern)
            .with_context(|| format!("Invalid name pattern '{}'", config.name_pattern))?;
        Ok(Self {
            config,
            scanner,
            validator,
            notifier,
            diagnostics,
        })
    }

    /// Run one cycle against `store`.
    pub fn run(&self, store: &dyn InventoryStore) -> Result<RunSummary> {
        let loaded = store
            .load()
            .with_context(|| format!("Failed to load inventory from {}", store.location()))?;
        let Some(mut inventory) = loaded else {
            return self.bootstrap(store);
        };
        self.diagnostics.record(CycleEvent::InventoryLoaded {
            folders: inventory.folder_count(),
            files: inventory.file_count(),
        });

        let mut summary = RunSummary::default();
        for folder in &self.config.folders {
            let result = self.process_folder(folder, &mut inventory);
            summary.absorb(result);
        }

        self.save(store, &inventory)?;
        info!("There were {} files updated", summary.files_updated);
        Ok(summary)
    }

    /// First run: record what is there without checking or mailing anyone.
    fn bootstrap(&self, store: &dyn InventoryStore) -> Result<RunSummary> {
        let mut inventory = Inventory::new();
        for folder in &self.config.folders {
            let snapshots = self.scan_or_empty(&folder.path);
            inventory.replace(&folder.path, snapshots);
        }
        self.save(store, &inventory)?;
        self.diagnostics.record(CycleEvent::Bootstrapped {
            folders: inventory.folder_count(),
            files: inventory.file_count(),
        });
        Ok(RunSummary {
            bootstrapped: true,
            ..RunSummary::default()
        })
    }

    fn save(&self, store: &dyn InventoryStore, inventory: &Inventory) -> Result<()> {
        store
            .save(inventory)
            .with_context(|| format!("Failed to save inventory to {}", store.location()))?;
        self.diagnostics.record(CycleEvent::InventorySaved {
            location: store.location(),
        });
        Ok(())
    }

    fn scan_or_empty(&self, folder: &Path) -> Vec<Snapshot> {
        match self.scanner.scan(folder) {
            Ok(snapshots) => snapshots,
            Err(err) => {
                self.diagnostics.record(CycleEvent::FolderUnreadable {
                    folder: folder.to_path_buf(),
                    reason: err.to_string(),
                });
                Vec::new()
            }
        }
    }

    fn process_folder(&self, folder: &FolderConfig, inventory: &mut Inventory) -> CycleResult {
        let path = folder.path.as_path();
        let mut result = CycleResult::new(path);

        // SCANNING
        if inventory.ensure_folder(path) {
            self.diagnostics.record(CycleEvent::FolderAdded {
                folder: path.to_path_buf(),
            });
        }
        let current = self.scan_or_empty(path);

        // DIFFING
        let previous = inventory.get(path).unwrap_or_default();
        let diff = match InventoryDiff::compute(previous, &current) {
            Ok(diff) => diff,
            Err(err) => {
                let reason = err.to_string();
                self.diagnostics.record(CycleEvent::FolderFailed {
                    folder: path.to_path_buf(),
                    reason: reason.clone(),
                });
                self.alert(&folder_failure_alert(path, &reason), &[]);
                result.state = FolderState::Failed;
                return result;
            }
        };
        if !diff.is_empty() || !diff.deleted.is_empty() {
            self.diagnostics.record(CycleEvent::ChangesFound {
                folder: path.to_path_buf(),
                new: diff.new.len(),
                modified: diff.modified.len(),
                deleted: diff.deleted.len(),
            });
        }

        // VALIDATING
        for snapshot in diff.changed() {
            let file = snapshot.path.as_path();
            if !file.exists() {
                self.diagnostics.record(CycleEvent::FileVanished {
                    file: file.to_path_buf(),
                });
                continue;
            }

            match self.validator.validate(file) {
                Outcome::ToolError(message) => {
                    self.diagnostics.record(CycleEvent::ToolError {
                        file: file.to_path_buf(),
                        message: message.clone(),
                    });
                    self.alert(
                        &tool_error_alert(&self.config.checker.name, file, &message),
                        &[],
                    );
                }
                Outcome::ReportMissing { expected } => {
                    self.diagnostics.record(CycleEvent::ReportMissing {
                        file: file.to_path_buf(),
                        expected,
                    });
                }
                Outcome::Malfunction {
                    line_count,
                    report_path,
                } => {
                    self.diagnostics.record(CycleEvent::Malfunction {
                        folder: path.to_path_buf(),
                        file: file.to_path_buf(),
                        line_count,
                    });
                    let alert = malfunction_alert(
                        &self.config.checker.name,
                        path,
                        file,
                        line_count,
                        self.config.checker.min_report_lines,
                    );
                    self.alert(&alert, &[report_path]);
                    result.malfunction_detected = true;
                    break;
                }
                checked @ (Outcome::Invalid { .. } | Outcome::Valid { .. }) => {
                    let invalid_count = checked.invalid_count();
                    self.record_checked(file, invalid_count, checked.line_count().unwrap_or(0));
                    result.invalid_count += invalid_count;
                    if let Some(report) = checked.report_path() {
                        result.report_attachments.push(report.to_path_buf());
                    }
                }
            }
        }

        result.new_files = diff.new.clone();
        result.modified_files = diff.modified.clone();

        // DECIDING
        if result.malfunction_detected {
            result.state = FolderState::Aborted;
            return result;
        }
        if !diff.is_empty() {
            result.owners_notified = self.notify_owners(folder, &result);
        }

        // PERSISTING
        inventory.replace(path, current);
        result.state = FolderState::Done;
        result
    }

    fn record_checked(&self, file: &Path, invalid_count: usize, line_count: usize) {
        self.diagnostics.record(CycleEvent::FileChecked {
            file: file.to_path_buf(),
            invalid_count,
            line_count,
        });
    }

    fn notify_owners(&self, folder: &FolderConfig, result: &CycleResult) -> bool {
        let folder_name = folder.name();
        let relative = |snapshots: &[Snapshot]| -> Vec<String> {
            snapshots
                .iter()
                .map(|snapshot| snapshot.display_relative_to(&folder.path))
                .collect()
        };
        let report = OwnerReport {
            folder_name: &folder_name,
            owner_names: folder.owners.iter().map(Contact::display_name).collect(),
            new_files: relative(&result.new_files),
            modified_files: relative(&result.modified_files),
            invalid_count: result.invalid_count,
            tool_name: &self.config.checker.name,
            marker: &self.config.checker.invalid_marker,
            signature: &self.config.mail.signature,
        };
        let composed = report.compose();
        match self
            .notifier
            .send_composed(&folder.owners, &composed, &result.report_attachments)
        {
            Ok(_) => {
                self.diagnostics.record(CycleEvent::OwnersNotified {
                    folder: folder.path.clone(),
                    owners: folder.owners.len(),
                });
                true
            }
            Err(err) => {
                self.diagnostics.record(CycleEvent::NotificationFailed {
                    subject: composed.subject,
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    /// Administrator alert; delivery failures are recorded, never raised.
    fn alert(&self, composed: &Composed, attachments: &[PathBuf]) {
        if let Err(err) = self.notifier.alert_administrators(composed, attachments) {
            self.diagnostics.record(CycleEvent::NotificationFailed {
                subject: composed.subject.clone(),
                reason: err.to_string(),
            });
        }
    }
}
