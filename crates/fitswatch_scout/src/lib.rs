//! fitswatch Scout - Folder Inventory Layer
//!
//! Scout takes stock of watched folders and works out what changed between
//! two runs. It never looks inside files: identity is the case-folded path,
//! and change is detected from filesystem timestamps alone.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Scanner   │     │   Differ    │     │    Store    │
//! │ (walk + glob│────▶│ (previous vs│────▶│ (YAML doc,  │
//! │  → Snapshot)│     │  current)   │     │  per folder)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Snapshot**: one file's path plus creation and modification instants
//! - **Inventory**: watched folder path → list of snapshots from its last scan
//! - **InventoryDiff**: new / modified / unchanged / deleted partition of a rescan

pub mod differ;
pub mod error;
pub mod patterns;
pub mod scan_path;
pub mod scanner;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use differ::{diff_modified, diff_new, InventoryDiff};
pub use error::{Result, ScoutError};
pub use patterns::{build_name_matcher, DEFAULT_NAME_PATTERN};
pub use scan_path::resolve_folder_path;
pub use scanner::{scan, Scanner};
pub use store::{InventoryStore, MemoryInventoryStore, YamlInventoryStore};
pub use types::{fold_path, Inventory, Snapshot};
