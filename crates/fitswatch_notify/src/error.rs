//! Error types for notification delivery

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid mail address '{input}': {source}")]
    Address {
        input: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Mail transport failed: {0}")]
    Transport(String),

    #[error("Message has no recipients")]
    NoRecipients,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        NotifyError::Build(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, NotifyError>;
