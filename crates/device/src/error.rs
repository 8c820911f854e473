//! Standalone error types for kernsim-device

use thiserror::Error;

/// Device driver errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The request queue is at capacity; the request was not accepted
    #[error("Device queue full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Processing loop is already running")]
    AlreadyRunning,

    #[error("Failed to spawn processing loop: {reason}")]
    Spawn { reason: String },

    #[error("Processing loop panicked")]
    WorkerPanicked,
}

impl DeviceError {
    /// Check if error is retryable
    ///
    /// A full queue drains on its own; submitting later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::QueueFull { .. } => "DEV:QUEUE:FULL",
            Self::InvalidConfig { .. } => "DEV:CONFIG:INVALID",
            Self::AlreadyRunning => "DEV:WORKER:RUNNING",
            Self::Spawn { .. } => "DEV:WORKER:SPAWN",
            Self::WorkerPanicked => "DEV:WORKER:PANIC",
        }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// Create spawn error from the underlying I/O failure
    pub fn spawn(err: &std::io::Error) -> Self {
        Self::Spawn {
            reason: err.to_string(),
        }
    }
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;
