//! Block ledger: the partition of one buffer into typed regions
//!
//! The ledger is an ordered `Vec<Region>`. Sequence order is physical
//! order: a split inserts the remainder directly after the region it was
//! carved from, and merges remove the absorbed neighbour in place, so
//! `regions[i + 1]` always starts where `regions[i]` ends.

use crate::error::{MemoryError, MemoryResult};

/// Bookkeeping cost of one region record
///
/// A free region is only split when the remainder would be larger than
/// this, so the pool never creates slivers smaller than their own record.
pub const REGION_OVERHEAD: usize = size_of::<Region>();

/// A contiguous byte range of the pool buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    offset: usize,
    size: usize,
    allocated: bool,
}

impl Region {
    pub(crate) const fn free(offset: usize, size: usize) -> Self {
        Self {
            offset,
            size,
            allocated: false,
        }
    }

    /// First byte of the region within the pool buffer
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// One past the last byte
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    #[inline]
    pub const fn is_allocated(&self) -> bool {
        self.allocated
    }

    #[inline]
    pub const fn is_free(&self) -> bool {
        !self.allocated
    }
}

/// Ordered sequence of regions covering `[0, capacity)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLedger {
    regions: Vec<Region>,
    capacity: usize,
}

impl BlockLedger {
    /// Create a ledger with a single free region spanning the whole capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let regions = if capacity == 0 {
            Vec::new()
        } else {
            vec![Region::free(0, capacity)]
        };
        Self { regions, capacity }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All regions in physical order
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of regions
    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// Index of the first free region of at least `size` bytes
    pub fn find_first_fit(&self, size: usize) -> Option<usize> {
        self.regions
            .iter()
            .position(|r| r.is_free() && r.size >= size)
    }

    /// Index of the region starting exactly at `offset`
    pub fn index_of(&self, offset: usize) -> Option<usize> {
        self.regions
            .binary_search_by_key(&offset, Region::offset)
            .ok()
    }

    /// Size of the largest free region, 0 if none
    pub fn largest_free(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.is_free())
            .map(Region::size)
            .max()
            .unwrap_or(0)
    }

    /// Number of free regions
    pub fn free_region_count(&self) -> usize {
        self.regions.iter().filter(|r| r.is_free()).count()
    }

    /// Sum of allocated region sizes
    pub fn allocated_bytes(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.is_allocated())
            .map(Region::size)
            .sum()
    }

    /// Shrink `regions[index]` to `size` and insert the remainder as a new
    /// free region right after it.
    pub(crate) fn split(&mut self, index: usize, size: usize) {
        let region = &mut self.regions[index];
        debug_assert!(size > 0 && size < region.size, "split must leave two non-empty regions");

        let remainder = Region::free(region.offset + size, region.size - size);
        region.size = size;
        self.regions.insert(index + 1, remainder);
    }

    pub(crate) fn mark_allocated(&mut self, index: usize) -> Region {
        let region = &mut self.regions[index];
        region.allocated = true;
        *region
    }

    pub(crate) fn mark_free(&mut self, index: usize) -> Region {
        let region = &mut self.regions[index];
        region.allocated = false;
        *region
    }

    /// Absorb `regions[index + 1]` into `regions[index]` when both are free.
    ///
    /// Returns whether a merge happened.
    pub(crate) fn merge_next(&mut self, index: usize) -> bool {
        let mergeable = matches!(
            (self.regions.get(index), self.regions.get(index + 1)),
            (Some(cur), Some(next)) if cur.is_free() && next.is_free()
        );
        if mergeable {
            let next = self.regions.remove(index + 1);
            self.regions[index].size += next.size;
        }
        mergeable
    }

    /// Verify the partition invariants
    ///
    /// Checks conservation (sizes sum to capacity), strictly increasing and
    /// contiguous offsets, and the absence of zero-size regions.
    pub fn check_invariants(&self) -> MemoryResult<()> {
        let mut expected_offset = 0usize;
        for (i, region) in self.regions.iter().enumerate() {
            if region.size == 0 {
                return Err(MemoryError::corruption(
                    "ledger",
                    format!("region {i} at offset {} has zero size", region.offset),
                ));
            }
            if region.offset != expected_offset {
                return Err(MemoryError::corruption(
                    "ledger",
                    format!(
                        "region {i} starts at {} but previous region ends at {expected_offset}",
                        region.offset
                    ),
                ));
            }
            expected_offset = region.end();
        }

        if expected_offset != self.capacity {
            return Err(MemoryError::corruption(
                "ledger",
                format!(
                    "regions cover {expected_offset} bytes, capacity is {}",
                    self.capacity
                ),
            ));
        }
        Ok(())
    }
}
