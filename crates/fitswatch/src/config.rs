//! Configuration for fitswatch
//!
//! One TOML document, loaded once at startup and passed down explicitly.
//!
//! ```toml
//! inventory_path = "/data/watch/inventory.yaml"
//! administrators = ["Andy Casey <andy@example.org>"]
//!
//! [checker]
//! script = "/opt/fitschecker/run_fitschecker.sh"
//! report_dir = "/opt/fitschecker/Output"
//!
//! [[folders]]
//! path = "/data/dropbox/WG11/Nice"
//! owners = ["Clare Worley <clare@example.org>"]
//! ```

use crate::paths::default_log_path;
use fitswatch_notify::{Contact, DryRunTransport, MailTransport, Notifier, SmtpRelay};
use fitswatch_scout::{resolve_folder_path, DEFAULT_NAME_PATTERN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Persisted inventory document
    pub inventory_path: PathBuf,

    /// Fixed log file
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Shell-style pattern for data files, matched case-insensitively
    #[serde(default = "default_name_pattern")]
    pub name_pattern: String,

    /// From address; defaults to `$USER@localhost`
    #[serde(default)]
    pub sender: Option<Contact>,

    /// Copied on every owner report and sole recipients of alerts
    #[serde(default)]
    pub administrators: Vec<Contact>,

    /// Folder leaf names left out of the status board
    #[serde(default = "default_summary_exclude")]
    pub summary_exclude: Vec<String>,

    pub checker: CheckerConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub folders: Vec<FolderConfig>,
}

/// External checker invocation and report interpretation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Name used in mail
    #[serde(default = "default_checker_name")]
    pub name: String,

    /// Program to launch
    pub script: PathBuf,

    /// Extra arguments passed to `script`
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory; defaults to the script's own directory
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Directory the checker writes dated reports into
    pub report_dir: PathBuf,

    /// Report file name with `{basename}` and `{date}` placeholders
    #[serde(default = "default_report_template")]
    pub report_template: String,

    /// Environment variable carrying the file to check
    #[serde(default = "default_file_env_var")]
    pub file_env_var: String,

    /// Reports shorter than this are treated as a checker malfunction
    #[serde(default = "default_min_report_lines")]
    pub min_report_lines: usize,

    /// Literal marker counted as one validation failure per occurrence
    #[serde(default = "default_invalid_marker")]
    pub invalid_marker: String,

    /// Give up on a checker run after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Group that should own published reports
    #[serde(default)]
    pub report_gid: Option<u32>,
}

/// Mail submission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_host")]
    pub host: String,

    #[serde(default = "default_mail_port")]
    pub port: u16,

    /// Log messages instead of sending them
    #[serde(default)]
    pub dry_run: bool,

    /// Sign-off line of owner reports
    #[serde(default = "default_signature")]
    pub signature: String,
}

/// One watched folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub owners: Vec<Contact>,
}

impl FolderConfig {
    /// Leaf component, used as the folder's name in mail.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn default_name_pattern() -> String {
    DEFAULT_NAME_PATTERN.to_string()
}

fn default_summary_exclude() -> Vec<String> {
    vec!["Recommended".to_string(), "PerSpectra".to_string()]
}

fn default_checker_name() -> String {
    "FITSCHECKER".to_string()
}

fn default_report_template() -> String {
    "{basename}_REPORT_{date}.log".to_string()
}

fn default_file_env_var() -> String {
    "filepath".to_string()
}

fn default_min_report_lines() -> usize {
    30
}

fn default_invalid_marker() -> String {
    "INVALID".to_string()
}

fn default_mail_host() -> String {
    "localhost".to_string()
}

fn default_mail_port() -> u16 {
    25
}

fn default_signature() -> String {
    "The fitswatch robot".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: default_mail_host(),
            port: default_mail_port(),
            dry_run: false,
            signature: default_signature(),
        }
    }
}

impl WatchConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: WatchConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.resolve_paths();
        config.validate()?;
        Ok(config)
    }

    /// Expand `~` in every path read from the file.
    fn resolve_paths(&mut self) {
        self.inventory_path = resolve_folder_path(&self.inventory_path);
        self.log_path = resolve_folder_path(&self.log_path);
        for folder in &mut self.folders {
            folder.path = resolve_folder_path(&folder.path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folders.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[folders]] entry is required".to_string(),
            ));
        }
        for folder in &self.folders {
            if folder.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("folder path must not be empty".to_string()));
            }
        }
        let template = &self.checker.report_template;
        if !template.contains("{basename}") || !template.contains("{date}") {
            return Err(ConfigError::Invalid(format!(
                "checker.report_template must contain {{basename}} and {{date}}, got '{template}'"
            )));
        }
        if self.checker.min_report_lines == 0 {
            return Err(ConfigError::Invalid(
                "checker.min_report_lines must be at least 1".to_string(),
            ));
        }
        if self.checker.invalid_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "checker.invalid_marker must not be empty".to_string(),
            ));
        }
        self.sender()?;
        Ok(())
    }

    /// Configured sender, or `$USER@localhost`.
    pub fn sender(&self) -> Result<Contact, ConfigError> {
        if let Some(sender) = &self.sender {
            return Ok(sender.clone());
        }
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "fitswatch".to_string());
        format!("{user}@localhost")
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("cannot derive sender address: {e}")))
    }

    /// Build the notifier: SMTP relay, or the dry-run transport when
    /// `mail.dry_run` is set or `force_dry_run` is true.
    pub fn build_notifier(&self, force_dry_run: bool) -> Result<Notifier, ConfigError> {
        let transport: Box<dyn MailTransport> = if self.mail.dry_run || force_dry_run {
            Box::new(DryRunTransport)
        } else {
            Box::new(SmtpRelay::new(&self.mail.host, self.mail.port))
        };
        Ok(Notifier::new(
            self.sender()?,
            self.administrators.clone(),
            transport,
        ))
    }
}
