//! Default locations under ~/.fitswatch/

use std::path::PathBuf;

/// Get the fitswatch home directory: ~/.fitswatch
pub fn fitswatch_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("FITSWATCH_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .map(|home| home.join(".fitswatch"))
        .unwrap_or_else(|| PathBuf::from(".fitswatch"))
}

/// Get the default config path: ~/.fitswatch/config.toml
pub fn default_config_path() -> PathBuf {
    fitswatch_home().join("config.toml")
}

/// Get the default log file: ~/.fitswatch/fitswatch.log
pub fn default_log_path() -> PathBuf {
    fitswatch_home().join("fitswatch.log")
}
