//! Report location and classification
//!
//! The checker writes `{report_dir}/{basename}_REPORT_{date}.log` (template is
//! configurable). Classification only looks at two numbers derived from the
//! text: newline count and literal marker occurrences.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// How a report reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportClass {
    /// Too short: the checker most likely did not process the file
    Malfunction,
    /// Complete, with at least one marker
    Invalid,
    /// Complete, no markers
    Valid,
}

/// Counts derived from one report's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportVerdict {
    pub line_count: usize,
    pub invalid_count: usize,
    pub class: ReportClass,
}

/// Lines are counted as newline characters, so a trailing unterminated line
/// does not count.
pub fn count_lines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Non-overlapping occurrences of `marker`.
pub fn count_marker(text: &str, marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }
    text.matches(marker).count()
}

pub fn classify_report(text: &str, min_lines: usize, marker: &str) -> ReportVerdict {
    let line_count = count_lines(text);
    let invalid_count = count_marker(text, marker);
    let class = if line_count < min_lines {
        ReportClass::Malfunction
    } else if invalid_count > 0 {
        ReportClass::Invalid
    } else {
        ReportClass::Valid
    };
    ReportVerdict {
        line_count,
        invalid_count,
        class,
    }
}

/// Base name of a data file without its extension.
pub fn file_basename(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Where the checker is expected to leave its report for `file` on `date`.
pub fn expected_report_path(
    report_dir: &Path,
    template: &str,
    file: &Path,
    date: NaiveDate,
) -> PathBuf {
    let name = template
        .replace("{basename}", &file_basename(file))
        .replace("{date}", &date.format("%Y-%m-%d").to_string());
    report_dir.join(name)
}

/// Date-free copy of the latest report, next to the data file.
///
/// `{basename}_REPORT_{date}.log` becomes `{basename}_REPORT.log`.
pub fn stable_report_path(template: &str, file: &Path) -> PathBuf {
    let name = template
        .replace("_{date}", "")
        .replace("{date}", "")
        .replace("{basename}", &file_basename(file));
    match file.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(lines: usize, markers: usize) -> String {
        let mut text = String::new();
        for i in 0..lines {
            if i < markers {
                text.push_str("HDU 1 keyword CRVAL1: INVALID\n");
            } else {
                text.push_str("HDU 1 keyword OK\n");
            }
        }
        text
    }

    #[test]
    fn test_thirty_clean_lines_is_valid() {
        let verdict = classify_report(&report_with(30, 0), 30, "INVALID");
        assert_eq!(verdict.class, ReportClass::Valid);
        assert_eq!(verdict.line_count, 30);
    }

    #[test]
    fn test_twenty_nine_lines_is_malfunction() {
        let verdict = classify_report(&report_with(29, 0), 30, "INVALID");
        assert_eq!(verdict.class, ReportClass::Malfunction);
        assert_eq!(verdict.line_count, 29);
    }

    #[test]
    fn test_one_marker_is_invalid() {
        let verdict = classify_report(&report_with(30, 1), 30, "INVALID");
        assert_eq!(verdict.class, ReportClass::Invalid);
        assert_eq!(verdict.invalid_count, 1);
    }

    #[test]
    fn test_short_report_with_markers_is_still_malfunction() {
        let verdict = classify_report(&report_with(5, 5), 30, "INVALID");
        assert_eq!(verdict.class, ReportClass::Malfunction);
        assert_eq!(verdict.invalid_count, 5);
    }

    #[test]
    fn test_unterminated_last_line_not_counted() {
        assert_eq!(count_lines("a\nb\nc"), 2);
        assert_eq!(count_lines(""), 0);
    }

    #[test]
    fn test_marker_counting_is_literal_and_case_sensitive() {
        assert_eq!(count_marker("INVALID invalid INVALIDINVALID", "INVALID"), 3);
        assert_eq!(count_marker("anything", ""), 0);
    }

    #[test]
    fn test_expected_report_path() {
        let date = NaiveDate::from_ymd_opt(2014, 2, 7).unwrap();
        let path = expected_report_path(
            Path::new("/opt/fitschecker/Output"),
            "{basename}_REPORT_{date}.log",
            Path::new("/data/WG11/Nice/GES_iDR3_Nice.fits"),
            date,
        );
        assert_eq!(
            path,
            PathBuf::from("/opt/fitschecker/Output/GES_iDR3_Nice_REPORT_2014-02-07.log")
        );
    }

    #[test]
    fn test_stable_report_path_drops_date() {
        let path = stable_report_path(
            "{basename}_REPORT_{date}.log",
            Path::new("/data/WG11/Nice/GES_iDR3_Nice.fits"),
        );
        assert_eq!(path, PathBuf::from("/data/WG11/Nice/GES_iDR3_Nice_REPORT.log"));
    }
}
