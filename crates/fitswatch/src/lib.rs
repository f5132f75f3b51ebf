//! fitswatch - Submission Watcher
//!
//! Watches shared folders for new or modified data files, runs an external
//! checker on each one, and mails the folder's owners a summary with the
//! checker's reports attached.
//!
//! One invocation runs one cycle:
//!
//! ```text
//! load inventory ─▶ per folder: scan ─▶ diff ─▶ validate each change ─▶ decide ─▶ persist
//!                                                   │                      │
//!                                                   └─ admin alerts        └─ owner report
//! ```
//!
//! A folder whose checker run malfunctions keeps its old inventory entry, so
//! its files are picked up again on the next run.

pub mod checker;
pub mod config;
pub mod cycle;
pub mod paths;
pub mod status;

pub use checker::{ExternalChecker, Outcome, Validator};
pub use config::{CheckerConfig, ConfigError, FolderConfig, MailConfig, WatchConfig};
pub use cycle::{
    CycleController, CycleEvent, CycleResult, Diagnostics, FolderState, MemoryDiagnostics,
    RunSummary, TracingDiagnostics,
};
pub use status::{build_status_board, StatusBoard, SubmissionStatus};
