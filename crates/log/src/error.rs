//! Error types for kernsim-log

use thiserror::Error;

/// Logging setup errors
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The filter directive could not be parsed
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A level name was not recognised
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber is already installed
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(String),
}

impl LogError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Filter(_) => "LOG:CONFIG:FILTER",
            Self::InvalidLevel(_) => "LOG:CONFIG:LEVEL",
            Self::AlreadyInitialized(_) => "LOG:INIT:DUPLICATE",
        }
    }
}

/// Result type for logging operations
pub type LogResult<T> = Result<T, LogError>;
