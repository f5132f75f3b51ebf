//! File-name pattern matching for inventory scans.

use crate::error::{Result, ScoutError};
use globset::{GlobBuilder, GlobMatcher};

/// Pattern used when a folder does not name its own.
pub const DEFAULT_NAME_PATTERN: &str = "*.fits";

/// Build a case-insensitive shell-style matcher for leaf file names.
///
/// The pattern is matched against the file name only, never the directory
/// part, so `*` does not need to cross separators.
pub fn build_name_matcher(pattern: &str) -> Result<GlobMatcher> {
    let pattern = pattern.trim();
    let pattern = if pattern.is_empty() { "*" } else { pattern };
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| ScoutError::Pattern(format!("invalid name pattern '{pattern}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_extension_case_insensitively() {
        let matcher = build_name_matcher(DEFAULT_NAME_PATTERN).unwrap();
        assert!(matcher.is_match("spectra.fits"));
        assert!(matcher.is_match("SPECTRA.FITS"));
        assert!(matcher.is_match("Mixed.Fits"));
        assert!(!matcher.is_match("spectra.fits.gz"));
        assert!(!matcher.is_match("notes.txt"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let matcher = build_name_matcher("  ").unwrap();
        assert!(matcher.is_match("anything.dat"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = build_name_matcher("[unclosed").unwrap_err();
        assert!(matches!(err, ScoutError::Pattern(_)));
    }
}
