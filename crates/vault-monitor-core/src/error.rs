//! Error types for Vault Monitor

use crate::types::Script;
use thiserror::Error;

/// Main error type for Vault Monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{} script not found", .0.label())]
    MissingScript(Script),

    /// An external script exited non-zero or timed out.
    #[error("{message}")]
    Execution {
        message: String,
        details: String,
        output: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
