//! Validation Runner
//!
//! Runs the external checker on one file and turns whatever happened into an
//! [`Outcome`]. Nothing here returns `Err`: launch failures, missing reports
//! and short reports are all outcomes the cycle branches on.

pub mod report;

use crate::config::CheckerConfig;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use report::{classify_report, expected_report_path, stable_report_path, ReportClass};
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of validating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The checker could not be launched or did not finish
    ToolError(String),
    /// The checker ran but left no report where expected
    ReportMissing { expected: PathBuf },
    /// Report shorter than the minimum line count
    Malfunction {
        line_count: usize,
        report_path: PathBuf,
    },
    /// Complete report with at least one marker
    Invalid {
        invalid_count: usize,
        line_count: usize,
        report_path: PathBuf,
    },
    /// Complete report with no markers
    Valid {
        line_count: usize,
        report_path: PathBuf,
    },
}

impl Outcome {
    /// Report produced by the checker, if any.
    pub fn report_path(&self) -> Option<&Path> {
        match self {
            Outcome::Malfunction { report_path, .. }
            | Outcome::Invalid { report_path, .. }
            | Outcome::Valid { report_path, .. } => Some(report_path),
            Outcome::ToolError(_) | Outcome::ReportMissing { .. } => None,
        }
    }

    /// Report length, for outcomes that produced a report.
    pub fn line_count(&self) -> Option<usize> {
        match self {
            Outcome::Malfunction { line_count, .. }
            | Outcome::Invalid { line_count, .. }
            | Outcome::Valid { line_count, .. } => Some(*line_count),
            Outcome::ToolError(_) | Outcome::ReportMissing { .. } => None,
        }
    }

    /// Marker occurrences; zero unless the report was invalid.
    pub fn invalid_count(&self) -> usize {
        match self {
            Outcome::Invalid { invalid_count, .. } => *invalid_count,
            _ => 0,
        }
    }
}

/// Validates a single file.
pub trait Validator {
    fn validate(&self, file: &Path) -> Outcome;
}

/// Runs the configured checker as a child process.
#[derive(Debug, Clone)]
pub struct ExternalChecker {
    config: CheckerConfig,
    date: Option<NaiveDate>,
}

impl ExternalChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config, date: None }
    }

    /// Pin the date used in report names instead of today's local date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    fn report_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn expected_report(&self, file: &Path) -> PathBuf {
        expected_report_path(
            &self.config.report_dir,
            &self.config.report_template,
            file,
            self.report_date(),
        )
    }

    fn script_path(&self) -> Result<PathBuf> {
        if self.config.script.is_absolute() {
            return Ok(self.config.script.clone());
        }
        let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
        Ok(cwd.join(&self.config.script))
    }

    /// Launch the checker and wait for it. Returns combined stdout/stderr.
    fn run(&self, file: &Path) -> Result<String> {
        let script = self.script_path()?;
        let working_dir = match &self.config.working_dir {
            Some(dir) => dir.clone(),
            None => script
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let mut output = tempfile::tempfile().context("Failed to create checker output buffer")?;
        let stderr = output
            .try_clone()
            .context("Failed to share checker output buffer")?;

        let mut child = Command::new(&script)
            .args(&self.config.args)
            .env(&self.config.file_env_var, file)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(
                output
                    .try_clone()
                    .context("Failed to share checker output buffer")?,
            ))
            .stderr(Stdio::from(stderr))
            .spawn()
            .with_context(|| format!("Failed to launch {}", script.display()))?;

        let status = match self.config.timeout_secs {
            Some(secs) => wait_with_timeout(&mut child, Duration::from_secs(secs))?,
            None => child.wait().context("Failed to wait for checker")?,
        };
        debug!(file = %file.display(), %status, "Checker exited");

        let mut text = Vec::new();
        output.seek(SeekFrom::Start(0))?;
        output.read_to_end(&mut text)?;
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    /// Make the report readable by the collaboration and copy it next to the
    /// data file under its date-free name.
    fn publish(&self, report: &Path, file: &Path) {
        if let Err(err) = share_with_group(report, self.config.report_gid) {
            warn!(report = %report.display(), error = %err, "Failed to adjust report ownership");
        }

        let stable = stable_report_path(&self.config.report_template, file);
        match fs::copy(report, &stable) {
            Ok(_) => info!(from = %report.display(), to = %stable.display(), "Copied report"),
            Err(err) => warn!(
                from = %report.display(),
                to = %stable.display(),
                error = %err,
                "Failed to copy report"
            ),
        }
    }
}

impl Validator for ExternalChecker {
    fn validate(&self, file: &Path) -> Outcome {
        let expected = self.expected_report(file);
        // A report left from an earlier run today must not stand in for this one
        if expected.exists() {
            warn!(report = %expected.display(), "Report already exists, removing it before the run");
            if let Err(err) = fs::remove_file(&expected) {
                return Outcome::ToolError(format!(
                    "Failed to remove stale report {}: {err}",
                    expected.display()
                ));
            }
        }

        info!(file = %file.display(), checker = %self.config.name, "Running checker");
        match self.run(file) {
            Ok(output) => {
                info!(file = %file.display(), "Checker finished with output:\n{}", output.trim_end())
            }
            Err(err) => return Outcome::ToolError(format!("{err:#}")),
        }

        if !expected.exists() {
            return Outcome::ReportMissing { expected };
        }
        let text = match fs::read(&expected) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                return Outcome::ToolError(format!(
                    "Failed to read report {}: {err}",
                    expected.display()
                ))
            }
        };

        let verdict = classify_report(
            &text,
            self.config.min_report_lines,
            &self.config.invalid_marker,
        );
        self.publish(&expected, file);

        match verdict.class {
            ReportClass::Malfunction => Outcome::Malfunction {
                line_count: verdict.line_count,
                report_path: expected,
            },
            ReportClass::Invalid => Outcome::Invalid {
                invalid_count: verdict.invalid_count,
                line_count: verdict.line_count,
                report_path: expected,
            },
            ReportClass::Valid => Outcome::Valid {
                line_count: verdict.line_count,
                report_path: expected,
            },
        }
    }
}

/// Poll for exit, killing the child once `timeout` has passed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("Failed to poll checker")? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            anyhow::bail!("Checker did not finish within {}s and was killed", timeout.as_secs());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn share_with_group(report: &Path, gid: Option<u32>) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(gid) = gid {
        std::os::unix::fs::chown(report, None, Some(gid))?;
    }
    let mut permissions = fs::metadata(report)?.permissions();
    permissions.set_mode(permissions.mode() | 0o040);
    fs::set_permissions(report, permissions)
}

#[cfg(not(unix))]
fn share_with_group(_report: &Path, _gid: Option<u32>) -> std::io::Result<()> {
    Ok(())
}
