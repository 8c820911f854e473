//! Standalone error types for kernsim-memory
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use thiserror::Error;

/// Memory pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// No free region is large enough for the request
    #[error(
        "Out of memory: requested {requested} bytes, {free} bytes free, largest free region {largest_free} bytes"
    )]
    OutOfMemory {
        requested: usize,
        free: usize,
        largest_free: usize,
    },

    /// The backing buffer could not be reserved
    #[error("Memory allocation failed: {size} bytes")]
    AllocationFailed { size: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A ledger invariant does not hold
    #[error("Memory corruption detected in {component}: {details}")]
    Corruption { component: String, details: String },
}

impl MemoryError {
    /// Check if error is retryable
    ///
    /// Running out of memory is recoverable: the caller may free something
    /// and try again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfMemory { .. } => "MEM:POOL:OOM",
            Self::AllocationFailed { .. } => "MEM:ALLOC:FAILED",
            Self::InvalidConfig { .. } => "MEM:CONFIG:INVALID",
            Self::Corruption { .. } => "MEM:LEDGER:CORRUPTION",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create out of memory error
    pub fn out_of_memory(requested: usize, free: usize, largest_free: usize) -> Self {
        Self::OutOfMemory {
            requested,
            free,
            largest_free,
        }
    }

    /// Create allocation failed error
    pub fn allocation_failed(size: usize) -> Self {
        Self::AllocationFailed { size }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// Create memory corruption error
    pub fn corruption(component: &str, details: impl Into<String>) -> Self {
        Self::Corruption {
            component: component.to_string(),
            details: details.into(),
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_memory_message() {
        let error = MemoryError::out_of_memory(4096, 2048, 1024);
        let text = error.to_string();
        assert!(text.contains("4096"));
        assert!(text.contains("2048"));
        assert!(text.contains("1024"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(MemoryError::out_of_memory(1, 0, 0).code(), "MEM:POOL:OOM");
        assert_eq!(
            MemoryError::invalid_config("zero capacity").code(),
            "MEM:CONFIG:INVALID"
        );
        assert_eq!(
            MemoryError::allocation_failed(64).code(),
            "MEM:ALLOC:FAILED"
        );
        assert_eq!(
            MemoryError::corruption("ledger", "overlap").code(),
            "MEM:LEDGER:CORRUPTION"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(MemoryError::out_of_memory(1, 0, 0).is_retryable());
        assert!(!MemoryError::invalid_config("x").is_retryable());
        assert!(!MemoryError::allocation_failed(1).is_retryable());
    }
}
