//! Mutex-guarded pool for use from several threads
//!
//! Every operation, reads included, takes the same exclusive lock. There is
//! no reader/writer split: stats must never observe a half-applied split or
//! merge.

use std::sync::Arc;

use kernsim_log::LogSink;
use parking_lot::Mutex;

use crate::config::PoolConfig;
use crate::error::MemoryResult;
use crate::ledger::Region;
use crate::pool::{Handle, MemoryPool};
use crate::stats::PoolStats;

/// Thread-safe wrapper around [`MemoryPool`]
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use kernsim_memory::ThreadSafePool;
///
/// let pool = Arc::new(ThreadSafePool::new(64 * 1024).unwrap());
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let pool = Arc::clone(&pool);
///         thread::spawn(move || {
///             let handle = pool.allocate(1024).unwrap().unwrap();
///             pool.deallocate(handle);
///         })
///     })
///     .collect();
///
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(pool.stats().used, 0);
/// ```
#[derive(Debug)]
pub struct ThreadSafePool {
    inner: Mutex<MemoryPool>,
}

impl ThreadSafePool {
    /// Create a pool of `capacity` bytes with default settings
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        MemoryPool::new(capacity).map(Self::from)
    }

    /// Create pool with custom configuration
    pub fn with_config(config: PoolConfig) -> MemoryResult<Self> {
        MemoryPool::with_config(config).map(Self::from)
    }

    /// Report allocator events to `sink`
    #[must_use = "builder methods must be chained or built"]
    pub fn with_sink(self, sink: Arc<dyn LogSink>) -> Self {
        Self::from(self.into_inner().with_sink(sink))
    }

    pub fn allocate(&self, size: usize) -> MemoryResult<Option<Handle>> {
        self.inner.lock().allocate(size)
    }

    pub fn deallocate(&self, handle: Handle) -> Option<usize> {
        self.inner.lock().deallocate(handle)
    }

    pub fn fragmentation_ratio(&self) -> f64 {
        self.inner.lock().fragmentation_ratio()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Copy of the current region sequence
    pub fn regions(&self) -> Vec<Region> {
        self.inner.lock().regions().to_vec()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn check_invariants(&self) -> MemoryResult<()> {
        self.inner.lock().check_invariants()
    }

    /// Run `f` over the bytes granted to `handle` while holding the lock
    pub fn with_bytes_mut<R>(&self, handle: Handle, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        let mut pool = self.inner.lock();
        pool.bytes_mut(handle).map(f)
    }

    /// Take the pool back out of the lock
    pub fn into_inner(self) -> MemoryPool {
        self.inner.into_inner()
    }
}

impl From<MemoryPool> for ThreadSafePool {
    fn from(pool: MemoryPool) -> Self {
        Self {
            inner: Mutex::new(pool),
        }
    }
}
