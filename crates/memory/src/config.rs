//! Pool configuration

use crate::error::{MemoryError, MemoryResult};
use crate::ledger::REGION_OVERHEAD;

/// Memory size constants
pub mod size {
    /// 1 Kilobyte
    pub const KB: usize = 1024;

    /// 1 Megabyte
    pub const MB: usize = 1024 * KB;
}

/// Default pool capacity (1 MiB)
pub const DEFAULT_POOL_CAPACITY: usize = size::MB;

/// How a freed region is merged with its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoalescePolicy {
    /// Merge only with the following region
    Forward,
    /// Merge with both the following and the preceding region
    #[default]
    Bidirectional,
}

/// Configuration for the pool allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size of the backing buffer in bytes, fixed for the pool's lifetime
    pub capacity: usize,

    /// A matched region is split only if it exceeds the request by more
    /// than this many bytes
    pub split_threshold: usize,

    /// Neighbour merging on free
    pub coalesce: CoalescePolicy,

    /// Fill pattern byte for newly allocated memory (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for deallocated memory (for debugging)
    pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            split_threshold: REGION_OVERHEAD,
            coalesce: CoalescePolicy::default(),
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
        }
    }
}

impl PoolConfig {
    /// Default configuration with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Debug configuration - fill patterns always on
    #[must_use]
    pub fn debug(capacity: usize) -> Self {
        Self {
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
            ..Self::new(capacity)
        }
    }

    /// Performance configuration - no fill patterns
    #[must_use]
    pub fn performance(capacity: usize) -> Self {
        Self {
            alloc_pattern: None,
            dealloc_pattern: None,
            ..Self::new(capacity)
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_split_threshold(mut self, threshold: usize) -> Self {
        self.split_threshold = threshold;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_coalesce(mut self, policy: CoalescePolicy) -> Self {
        self.coalesce = policy;
        self
    }

    /// Check the configuration
    pub fn validate(&self) -> MemoryResult<()> {
        if self.capacity == 0 {
            return Err(MemoryError::invalid_config("pool capacity must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_split_threshold_is_region_overhead() {
        assert_eq!(PoolConfig::default().split_threshold, REGION_OVERHEAD);
        assert_eq!(PoolConfig::default().capacity, 1_048_576);
    }

    #[test]
    fn presets() {
        assert_eq!(PoolConfig::debug(64).alloc_pattern, Some(0xBB));
        assert_eq!(PoolConfig::performance(64).dealloc_pattern, None);
        assert_eq!(
            PoolConfig::new(64)
                .with_coalesce(CoalescePolicy::Forward)
                .coalesce,
            CoalescePolicy::Forward
        );
    }

    #[test]
    fn zero_capacity_is_invalid() {
        assert!(PoolConfig::new(0).validate().is_err());
        assert!(PoolConfig::new(1).validate().is_ok());
    }
}
