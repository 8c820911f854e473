//! Read-only device snapshot

use core::fmt;

use crate::status::DeviceStatus;

/// Point-in-time view of the device and its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStats {
    pub status: DeviceStatus,
    /// Requests waiting to be processed
    pub queue_depth: usize,
    pub queue_capacity: usize,
    /// Requests accepted since creation
    pub submitted: u64,
    /// Submissions refused because the queue was full
    pub rejected: u64,
    /// Requests the processing loop has finished
    pub processed: u64,
}

impl DeviceStats {
    /// Requests accepted but not yet finished, including one in flight
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.processed)
    }
}

impl fmt::Display for DeviceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device Driver Stats:")?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Queue Size: {}/{}", self.queue_depth, self.queue_capacity)?;
        write!(
            f,
            "Processed: {} (submitted {}, rejected {})",
            self.processed, self.submitted, self.rejected
        )
    }
}
