//! Command-line surface

pub mod error;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};
use error::HelpfulError;
use fitswatch::paths::default_config_path;
use fitswatch::{ConfigError, WatchConfig};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "fitswatch",
    about = "Check new submissions in watched folders and mail their owners"
)]
pub struct Cli {
    /// Config file (default: $FITSWATCH_HOME/config.toml or ~/.fitswatch/config.toml)
    #[arg(short, long, global = true, env = "FITSWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug output on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log mail instead of sending it
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run one watch cycle (the default)
    Run,
    /// Summarise which folders have a passing submission
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

pub fn load_config(path: &Path) -> Result<WatchConfig, HelpfulError> {
    WatchConfig::load(path).map_err(|err| match err {
        ConfigError::NotFound(_) => HelpfulError::config_not_found(path),
        other => HelpfulError::config_invalid(path, &other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["fitswatch", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_status_json_flag() {
        let cli = Cli::try_parse_from(["fitswatch", "status", "--json", "--dry-run"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Status { json: true }));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(
            resolve_config_path(Some(Path::new("/etc/fitswatch.toml"))),
            PathBuf::from("/etc/fitswatch.toml")
        );
    }
}
