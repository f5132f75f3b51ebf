//! Error types for the Scout system

use crate::scan_path::ScanPathError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Scout error type
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    ScanPath(#[from] ScanPathError),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("Inventory format error: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("Failed to persist inventory: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Paths differ only by case: '{}' and '{}'", .first.display(), .second.display())]
    CaseCollision { first: PathBuf, second: PathBuf },
}

impl ScoutError {
    /// True for errors raised while reading the watched folder itself.
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            ScoutError::Io(_) | ScoutError::Walk(_) | ScoutError::ScanPath(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ScoutError>;
