//! Shared logging setup for fitswatch binaries.
//!
//! Every run appends timestamped, leveled lines to one fixed log file and
//! mirrors them to stderr. The file is the operator's record of which files
//! were checked, skipped, or failed; stderr is for whoever runs it by hand.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "fitswatch=info,fitswatch_scout=info,fitswatch_notify=info";
const VERBOSE_LOG_FILTER: &str = "fitswatch=debug,fitswatch_scout=debug,fitswatch_notify=debug";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Log path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("Failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Logging configuration shared by fitswatch binaries.
#[derive(Debug, Clone)]
pub struct LogConfig<'a> {
    /// Fixed file that receives every log line
    pub log_path: &'a Path,
    /// Raise the console filter to debug
    pub verbose: bool,
}

/// Initialize tracing with a file writer and stderr output.
///
/// The returned guard flushes the file writer on drop; hold it for the
/// lifetime of the process.
pub fn init_logging(config: LogConfig<'_>) -> Result<WorkerGuard, LoggingError> {
    let (dir, file_name) = split_log_path(config.log_path)?;
    fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoggingError::NoFileName(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_directory_and_file_name() {
        let (dir, name) = split_log_path(Path::new("/var/log/fitswatch/run.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/fitswatch"));
        assert_eq!(name, "run.log");
    }

    #[test]
    fn bare_file_name_logs_to_working_directory() {
        let (dir, name) = split_log_path(Path::new("fitswatch.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "fitswatch.log");
    }

    #[test]
    fn rejects_path_without_file_name() {
        assert!(matches!(
            split_log_path(Path::new("/")),
            Err(LoggingError::NoFileName(_))
        ));
    }

    #[test]
    fn creates_missing_log_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let log_path = temp.path().join("nested/logs/fitswatch.log");
        // The global subscriber can only be installed once per test binary,
        // so only the first caller gets Ok; the directory is created either way.
        let _ = init_logging(LogConfig {
            log_path: &log_path,
            verbose: false,
        });
        assert!(log_path.parent().unwrap().is_dir());
    }
}
