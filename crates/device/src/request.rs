//! Device requests

use std::time::{Duration, Instant};

/// A queued I/O request
///
/// Created on submission, consumed exactly once by the processing loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: u64,
    operation: String,
    payload_size: usize,
    enqueued_at: Instant,
}

impl Request {
    pub(crate) fn new(id: u64, operation: String, payload_size: usize) -> Self {
        Self {
            id,
            operation,
            payload_size,
            enqueued_at: Instant::now(),
        }
    }

    /// Acceptance sequence number, increasing in submission order
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Free-form operation tag, e.g. `read` or `write`
    #[inline]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[inline]
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    #[inline]
    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    /// Time since submission
    pub fn age(&self) -> Duration {
        self.enqueued_at.elapsed()
    }
}
