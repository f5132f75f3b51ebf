//! fitswatch launcher
//!
//! Usage:
//!   fitswatch                 # one watch cycle
//!   fitswatch status --json   # submission status board

use clap::Parser;
use fitswatch_logging::{init_logging, LogConfig};
use std::process::ExitCode;
use tracing::error;

mod cli;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli::resolve_config_path(cli.config.as_deref());
    let config = match cli::load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    let _log_guard = match init_logging(LogConfig {
        log_path: &config.log_path,
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {err}");
            None
        }
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::run::run(&config, cli.dry_run),
        Commands::Status { json } => cli::status::run(&config, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("{err:?}");
            ExitCode::from(1)
        }
    }
}
