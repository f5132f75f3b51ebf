//! Submission status board
//!
//! Reads the stored inventory and the date-free report copies next to each
//! data file, and sorts folders into passed, failing and not submitted.

use crate::checker::report::{count_lines, count_marker, stable_report_path};
use crate::config::CheckerConfig;
use fitswatch_scout::{Inventory, Snapshot};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Marker and line counts of one file's latest report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub invalid_count: usize,
    pub line_count: usize,
    pub report_found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// At least one file has a complete report without markers
    Passed { file: PathBuf },
    /// Files submitted, none passing
    Failing { files: Vec<FileReport> },
    NotSubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderStatus {
    /// Last two path components, e.g. `WG11 Nice`
    pub label: String,
    pub folder: PathBuf,
    #[serde(flatten)]
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBoard {
    pub folders: Vec<FolderStatus>,
}

pub fn build_status_board(
    inventory: &Inventory,
    checker: &CheckerConfig,
    exclude: &[String],
) -> StatusBoard {
    let mut folders = Vec::new();
    for (folder, snapshots) in inventory.iter() {
        let leaf = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if exclude.iter().any(|excluded| *excluded == leaf) {
            continue;
        }
        folders.push(FolderStatus {
            label: folder_label(folder),
            folder: folder.to_path_buf(),
            status: submission_status(snapshots, checker),
        });
    }
    StatusBoard { folders }
}

fn submission_status(snapshots: &[Snapshot], checker: &CheckerConfig) -> SubmissionStatus {
    if snapshots.is_empty() {
        return SubmissionStatus::NotSubmitted;
    }
    let mut files = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        let report = read_file_report(&snapshot.path, checker);
        if report.line_count >= checker.min_report_lines && report.invalid_count == 0 {
            return SubmissionStatus::Passed {
                file: snapshot.path.clone(),
            };
        }
        files.push(report);
    }
    SubmissionStatus::Failing { files }
}

fn read_file_report(file: &Path, checker: &CheckerConfig) -> FileReport {
    let report = stable_report_path(&checker.report_template, file);
    match std::fs::read(&report) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            FileReport {
                file: file.to_path_buf(),
                invalid_count: count_marker(&text, &checker.invalid_marker),
                line_count: count_lines(&text),
                report_found: true,
            }
        }
        Err(_) => FileReport {
            file: file.to_path_buf(),
            invalid_count: 0,
            line_count: 0,
            report_found: false,
        },
    }
}

fn folder_label(folder: &Path) -> String {
    let parts: Vec<String> = folder
        .components()
        .rev()
        .take(2)
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.into_iter().rev().collect::<Vec<_>>().join(" ")
}

impl StatusBoard {
    pub fn render_text(&self, marker: &str) -> String {
        let mut sorted: Vec<&FolderStatus> = self.folders.iter().collect();
        sorted.sort_by(|a, b| a.label.cmp(&b.label));

        let mut out = String::new();
        let _ = writeln!(out, "Folders with valid submissions:");
        for entry in &sorted {
            if let SubmissionStatus::Passed { file } = &entry.status {
                let _ = writeln!(out, "    {}: {}", entry.label, file.display());
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Folders with submissions that still have errors:");
        for entry in &sorted {
            if let SubmissionStatus::Failing { files } = &entry.status {
                let _ = writeln!(out, "    {}:", entry.label);
                for report in files {
                    let missing = if report.report_found { "" } else { " (no report)" };
                    let _ = writeln!(
                        out,
                        "        {}: {} {marker}s, {} lines{missing}",
                        report.file.display(),
                        report.invalid_count,
                        report.line_count
                    );
                }
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Folders without submissions:");
        for entry in &sorted {
            if entry.status == SubmissionStatus::NotSubmitted {
                let _ = writeln!(out, "    {}", entry.label);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use tempfile::TempDir;

    fn checker() -> CheckerConfig {
        CheckerConfig {
            name: "FITSCHECKER".to_string(),
            script: PathBuf::from("/opt/fitschecker/run.sh"),
            args: Vec::new(),
            working_dir: None,
            report_dir: PathBuf::from("/opt/fitschecker/Output"),
            report_template: "{basename}_REPORT_{date}.log".to_string(),
            file_env_var: "filepath".to_string(),
            min_report_lines: 30,
            invalid_marker: "INVALID".to_string(),
            timeout_secs: None,
            report_gid: None,
        }
    }

    fn write_report(dir: &Path, basename: &str, lines: usize, markers: usize) {
        let mut text = String::new();
        for i in 0..lines {
            text.push_str(if i < markers { "INVALID\n" } else { "ok\n" });
        }
        fs::write(dir.join(format!("{basename}_REPORT.log")), text).unwrap();
    }

    fn snapshot(path: PathBuf) -> Snapshot {
        let now = Utc::now();
        Snapshot::new(path, now, now)
    }

    #[test]
    fn test_board_classifies_folders() {
        let temp = TempDir::new().unwrap();
        let nice = temp.path().join("WG11").join("Nice");
        let lumba = temp.path().join("WG11").join("Lumba");
        let arcetri = temp.path().join("WG10").join("Arcetri");
        let recommended = temp.path().join("WG15").join("Recommended");
        for dir in [&nice, &lumba, &arcetri, &recommended] {
            fs::create_dir_all(dir).unwrap();
        }
        write_report(&nice, "nice", 40, 0);
        write_report(&lumba, "lumba", 40, 2);

        let mut inventory = Inventory::new();
        inventory.replace(&nice, vec![snapshot(nice.join("nice.fits"))]);
        inventory.replace(
            &lumba,
            vec![
                snapshot(lumba.join("lumba.fits")),
                snapshot(lumba.join("missing.fits")),
            ],
        );
        inventory.replace(&arcetri, Vec::new());
        inventory.replace(&recommended, Vec::new());

        let exclude = vec!["Recommended".to_string()];
        let board = build_status_board(&inventory, &checker(), &exclude);
        assert_eq!(board.folders.len(), 3);

        let by_label = |label: &str| {
            board
                .folders
                .iter()
                .find(|entry| entry.label == label)
                .unwrap()
                .status
                .clone()
        };
        assert_eq!(
            by_label("WG11 Nice"),
            SubmissionStatus::Passed {
                file: nice.join("nice.fits")
            }
        );
        match by_label("WG11 Lumba") {
            SubmissionStatus::Failing { files } => {
                assert_eq!(files.len(), 2);
                assert_eq!(files[0].invalid_count, 2);
                assert_eq!(files[0].line_count, 40);
                assert!(!files[1].report_found);
                assert_eq!(files[1].line_count, 0);
            }
            other => panic!("expected failing, got {other:?}"),
        }
        assert_eq!(by_label("WG10 Arcetri"), SubmissionStatus::NotSubmitted);

        let text = board.render_text("INVALID");
        assert!(text.contains("    WG11 Nice: "));
        assert!(text.contains("2 INVALIDs, 40 lines"));
        assert!(text.contains("    WG10 Arcetri\n"));
        assert!(!text.contains("Recommended"));
    }

    #[test]
    fn test_short_clean_report_is_not_a_pass() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("WG11").join("Nice");
        fs::create_dir_all(&folder).unwrap();
        write_report(&folder, "short", 10, 0);

        let mut inventory = Inventory::new();
        inventory.replace(&folder, vec![snapshot(folder.join("short.fits"))]);
        let board = build_status_board(&inventory, &checker(), &[]);
        assert!(matches!(
            board.folders[0].status,
            SubmissionStatus::Failing { .. }
        ));
    }

    #[test]
    fn test_json_shape() {
        let board = StatusBoard {
            folders: vec![FolderStatus {
                label: "WG11 Nice".to_string(),
                folder: PathBuf::from("/data/WG11/Nice"),
                status: SubmissionStatus::NotSubmitted,
            }],
        };
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["folders"][0]["status"], "not_submitted");
        assert_eq!(json["folders"][0]["label"], "WG11 Nice");
    }
}
