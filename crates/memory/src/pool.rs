//! First-fit pool allocator over a single owned buffer
//!
//! Callers get a [`Handle`] (the granted region's offset) instead of a raw
//! pointer. Bytes are reached through [`MemoryPool::bytes`] and
//! [`MemoryPool::bytes_mut`], which borrow from the pool, so a handle can
//! never outlive or alias the buffer.

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;
use std::sync::Arc;

use kernsim_log::{LogSink, NoopSink};

use crate::config::{CoalescePolicy, PoolConfig};
use crate::error::{MemoryError, MemoryResult};
use crate::ledger::{BlockLedger, Region};
use crate::stats::PoolStats;

/// Opaque allocation handle: the offset of the granted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Rebuild a handle from an offset (e.g. one typed back in by a user)
    #[must_use]
    pub const fn from_offset(offset: usize) -> Self {
        Self(offset)
    }

    #[must_use]
    pub const fn offset(self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Handle {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Fixed-capacity first-fit allocator with splitting and coalescing
pub struct MemoryPool {
    buffer: Box<[u8]>,
    ledger: BlockLedger,
    used: usize,
    config: PoolConfig,
    sink: Arc<dyn LogSink>,
}

impl MemoryPool {
    /// Create a pool of `capacity` bytes with default settings
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(PoolConfig::new(capacity))
    }

    /// Create a pool with custom configuration
    pub fn with_config(config: PoolConfig) -> MemoryResult<Self> {
        config.validate()?;

        Ok(Self {
            buffer: zeroed_buffer(config.capacity)?,
            ledger: BlockLedger::new(config.capacity),
            used: 0,
            config,
            sink: Arc::new(NoopSink),
        })
    }

    /// Report allocator events to `sink`
    #[must_use = "builder methods must be chained or built"]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Allocate `size` bytes
    ///
    /// `size == 0` is a no-op returning `Ok(None)`. Otherwise the first free
    /// region large enough is granted, split first if it exceeds `size` by
    /// more than the split threshold. The used counter grows by the granted
    /// region's size, which can exceed `size` when no split happened.
    ///
    /// On `OutOfMemory` the ledger is left untouched.
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Option<Handle>> {
        if size == 0 {
            return Ok(None);
        }

        let Some(index) = self.ledger.find_first_fit(size) else {
            let err = MemoryError::out_of_memory(size, self.free(), self.ledger.largest_free());
            self.sink.warn(&err.to_string());
            return Err(err);
        };

        if self.ledger.regions()[index].size() > size.saturating_add(self.config.split_threshold)
        {
            self.ledger.split(index, size);
        }

        let region = self.ledger.mark_allocated(index);
        self.used += region.size();

        if let Some(pattern) = self.config.alloc_pattern {
            self.buffer[region.offset()..region.end()].fill(pattern);
        }

        self.sink.debug(&format!(
            "allocated {} bytes at offset {} (requested {size})",
            region.size(),
            region.offset()
        ));
        self.debug_check();

        Ok(Some(Handle(region.offset())))
    }

    /// Release the region identified by `handle`
    ///
    /// Returns the number of bytes released. Unknown handles and handles
    /// naming an already free region are ignored and return `None`.
    pub fn deallocate(&mut self, handle: Handle) -> Option<usize> {
        let index = match self.ledger.index_of(handle.offset()) {
            Some(index) if self.ledger.regions()[index].is_allocated() => index,
            _ => {
                self.sink
                    .debug(&format!("ignored free of unknown handle {handle}"));
                return None;
            }
        };

        let region = self.ledger.mark_free(index);
        self.used -= region.size();

        if let Some(pattern) = self.config.dealloc_pattern {
            self.buffer[region.offset()..region.end()].fill(pattern);
        }

        let mut merged = usize::from(self.ledger.merge_next(index));
        if self.config.coalesce == CoalescePolicy::Bidirectional
            && index > 0
            && self.ledger.merge_next(index - 1)
        {
            merged += 1;
        }

        self.sink.debug(&format!(
            "freed {} bytes at offset {} ({merged} neighbour(s) merged)",
            region.size(),
            region.offset()
        ));
        self.debug_check();

        Some(region.size())
    }

    /// How scattered the free bytes are
    ///
    /// `0.0` when one region holds every free byte (or nothing is free),
    /// approaching `1.0` as free space splinters into many small regions.
    pub fn fragmentation_ratio(&self) -> f64 {
        let total_free = self.free();
        if total_free == 0 {
            return 0.0;
        }
        1.0 - (self.ledger.largest_free() as f64 / total_free as f64)
    }

    /// Snapshot of the pool's accounting
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity(),
            used: self.used,
            free: self.free(),
            fragmentation: self.fragmentation_ratio(),
            region_count: self.ledger.len(),
            free_regions: self.ledger.free_region_count(),
            largest_free: self.ledger.largest_free(),
        }
    }

    /// Borrow the bytes granted to `handle`
    pub fn bytes(&self, handle: Handle) -> Option<&[u8]> {
        let region = self.allocated_region(handle)?;
        Some(&self.buffer[region.offset()..region.end()])
    }

    /// Mutably borrow the bytes granted to `handle`
    pub fn bytes_mut(&mut self, handle: Handle) -> Option<&mut [u8]> {
        let region = self.allocated_region(handle)?;
        Some(&mut self.buffer[region.offset()..region.end()])
    }

    /// The allocated region behind `handle`, if any
    pub fn region(&self, handle: Handle) -> Option<Region> {
        self.allocated_region(handle)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.capacity() - self.used
    }

    #[inline]
    pub fn region_count(&self) -> usize {
        self.ledger.len()
    }

    /// All regions in physical order
    pub fn regions(&self) -> &[Region] {
        self.ledger.regions()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Verify ledger invariants and the used counter
    pub fn check_invariants(&self) -> MemoryResult<()> {
        self.ledger.check_invariants()?;
        let allocated = self.ledger.allocated_bytes();
        if allocated != self.used {
            return Err(MemoryError::corruption(
                "pool",
                format!(
                    "used counter is {} but allocated regions sum to {allocated}",
                    self.used
                ),
            ));
        }
        Ok(())
    }

    fn allocated_region(&self, handle: Handle) -> Option<Region> {
        let index = self.ledger.index_of(handle.offset())?;
        self.ledger
            .get(index)
            .copied()
            .filter(Region::is_allocated)
    }

    #[inline]
    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.check_invariants() {
            self.sink.error(&e.to_string());
            panic!("pool invariant violated: {e}");
        }
    }
}

/// Reserve the backing buffer without aborting on an impossible size
fn zeroed_buffer(capacity: usize) -> MemoryResult<Box<[u8]>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| MemoryError::allocation_failed(capacity))?;
    buffer.resize(capacity, 0);
    Ok(buffer.into_boxed_slice())
}

impl fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPool")
            .field("capacity", &self.capacity())
            .field("used", &self.used)
            .field("regions", &self.ledger.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
