//! Watched-folder path resolution and pre-scan checks.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScanPathError {
    #[error("Watched folder not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Watched folder is not a directory: {}", .0.display())]
    NotDirectory(PathBuf),
    #[error("Cannot read watched folder: {}", .0.display())]
    NotReadable(PathBuf),
}

/// Resolve a configured folder path; a leading `~` component becomes the
/// current user's home directory.
pub fn resolve_folder_path(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home,
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

pub fn validate_scan_path(path: &Path) -> Result<(), ScanPathError> {
    if !path.exists() {
        return Err(ScanPathError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ScanPathError::NotDirectory(path.to_path_buf()));
    }
    if std::fs::read_dir(path).is_err() {
        return Err(ScanPathError::NotReadable(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_missing_and_file_paths() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            validate_scan_path(&missing),
            Err(ScanPathError::NotFound(_))
        ));

        let file = temp.path().join("a.fits");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            validate_scan_path(&file),
            Err(ScanPathError::NotDirectory(_))
        ));

        assert!(validate_scan_path(temp.path()).is_ok());
    }

    #[test]
    fn resolves_leading_tilde_only() {
        let plain = Path::new("/data/WG11/Nice");
        assert_eq!(resolve_folder_path(plain), plain);
        assert_eq!(
            resolve_folder_path(Path::new("data/~/Nice")),
            Path::new("data/~/Nice")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_folder_path(Path::new("~/drop")), home.join("drop"));
            assert_eq!(resolve_folder_path(Path::new("~")), home);
        }
    }
}
