//! Startup errors with context and suggestions

use fitswatch::ConfigError;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// No config file at the resolved location
    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Config file not found: {}", path.display()))
            .with_context("fitswatch needs a config file listing the folders to watch")
            .with_suggestion(format!("TRY: Create {}", path.display()))
            .with_suggestion("TRY: Point at another file with --config <PATH> or FITSWATCH_CONFIG")
    }

    /// Config exists but could not be read, parsed or validated
    pub fn config_invalid(path: &Path, err: &ConfigError) -> Self {
        let suggestion = match err {
            ConfigError::Read { .. } => "TRY: Check read permissions on the config file",
            ConfigError::Parse { .. } => "TRY: Fix the TOML syntax reported above",
            _ => "TRY: Fix the setting named above and run again",
        };
        Self::new(err.to_string())
            .with_context(format!("While loading {}", path.display()))
            .with_suggestion(suggestion)
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_display_includes_suggestions() {
        let err = HelpfulError::config_not_found(&PathBuf::from("/etc/fitswatch.toml"));
        let text = err.to_string();
        assert!(text.starts_with("ERROR: Config file not found: /etc/fitswatch.toml"));
        assert!(text.contains("CONTEXT: "));
        assert!(text.contains("--config"));
    }

    #[test]
    fn test_invalid_config_names_setting() {
        let err = HelpfulError::config_invalid(
            &PathBuf::from("/etc/fitswatch.toml"),
            &ConfigError::Invalid("at least one [[folders]] entry is required".to_string()),
        );
        assert!(err.to_string().contains("[[folders]]"));
    }
}
