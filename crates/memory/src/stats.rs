//! Read-only pool snapshot

use core::fmt;

/// Point-in-time view of a pool's accounting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    /// Total buffer size
    pub capacity: usize,
    /// Sum of granted region sizes
    pub used: usize,
    /// `capacity - used`
    pub free: usize,
    /// Fragmentation ratio in `[0.0, 1.0]`
    pub fragmentation: f64,
    /// Number of regions, free and allocated
    pub region_count: usize,
    /// Number of free regions
    pub free_regions: usize,
    /// Size of the largest free region
    pub largest_free: usize,
}

impl PoolStats {
    /// Fraction of capacity in use
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.capacity as f64
        }
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory Pool Stats:")?;
        writeln!(f, "Total Size: {} bytes", self.capacity)?;
        writeln!(f, "Used Size: {} bytes", self.used)?;
        writeln!(f, "Free Size: {} bytes", self.free)?;
        writeln!(f, "Fragmentation: {:.2}%", self.fragmentation * 100.0)?;
        write!(f, "Number of blocks: {}", self.region_count)
    }
}
