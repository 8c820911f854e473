//! Device state

use core::fmt;

/// Visible device state
///
/// `Ready` and `Busy` follow whether the processing loop holds a dequeued
/// request. `Error` is only entered through the fault-injection hook
/// ([`RequestQueue::inject_fault`](crate::RequestQueue::inject_fault)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceStatus {
    /// Idle: queue empty or loop not running
    #[default]
    Ready,
    /// The loop is processing a request
    Busy,
    /// Fault condition
    Error,
}

impl DeviceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Busy => "BUSY",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
