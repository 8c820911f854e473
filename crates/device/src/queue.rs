//! Bounded FIFO of pending device requests
//!
//! The queue, its counters, the device status and the stop flag all live
//! behind one mutex. The processing loop blocks on `not_empty` while idle
//! and is woken by each accepted submission and by [`RequestQueue::stop`].

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::error::{DeviceError, DeviceResult};
use crate::request::Request;
use crate::stats::DeviceStats;
use crate::status::DeviceStatus;

#[derive(Debug)]
struct QueueState {
    pending: VecDeque<Request>,
    status: DeviceStatus,
    stopped: bool,
    next_id: u64,
    submitted: u64,
    rejected: u64,
    processed: u64,
}

/// Bounded request queue shared between producers and the processing loop
#[derive(Debug)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    capacity: usize,
}

impl RequestQueue {
    /// Empty queue holding at most `capacity` pending requests
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::with_capacity(capacity),
                status: DeviceStatus::Ready,
                stopped: false,
                next_id: 0,
                submitted: 0,
                rejected: 0,
                processed: 0,
            }),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Enqueue a request, returning `false` if the queue is full
    pub fn submit(&self, operation: impl Into<String>, payload_size: usize) -> bool {
        self.try_submit(operation, payload_size).is_ok()
    }

    /// Enqueue a request and return its id
    ///
    /// # Errors
    ///
    /// [`DeviceError::QueueFull`] when `capacity` requests are already
    /// pending. The queue is left unchanged.
    pub fn try_submit(&self, operation: impl Into<String>, payload_size: usize) -> DeviceResult<u64> {
        let mut state = self.state.lock();
        if state.pending.len() >= self.capacity {
            state.rejected += 1;
            return Err(DeviceError::QueueFull {
                capacity: self.capacity,
            });
        }

        let id = state.next_id;
        state.next_id += 1;
        state.submitted += 1;
        state.pending.push_back(Request::new(id, operation.into(), payload_size));
        drop(state);

        self.not_empty.notify_one();
        Ok(id)
    }

    /// Number of pending requests
    pub fn depth(&self) -> usize {
        self.state.lock().pending.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn status(&self) -> DeviceStatus {
        self.state.lock().status
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    /// Consistent snapshot of status, depth and counters
    pub fn stats(&self) -> DeviceStats {
        let state = self.state.lock();
        DeviceStats {
            status: state.status,
            queue_depth: state.pending.len(),
            queue_capacity: self.capacity,
            submitted: state.submitted,
            rejected: state.rejected,
            processed: state.processed,
        }
    }

    /// Ask the processing loop to exit
    ///
    /// The flag is sticky: it stays set until the loop is started again, so
    /// a stop issued while a request is in flight is seen as soon as that
    /// request completes. Pending requests are left in the queue.
    pub fn stop(&self) {
        self.state.lock().stopped = true;
        self.not_empty.notify_all();
    }

    pub(crate) fn resume(&self) {
        self.state.lock().stopped = false;
    }

    /// Force the device into [`DeviceStatus::Error`]
    ///
    /// The processing loop overwrites the status on its next transition.
    pub fn inject_fault(&self) {
        self.state.lock().status = DeviceStatus::Error;
    }

    /// Leave [`DeviceStatus::Error`] for [`DeviceStatus::Ready`]
    ///
    /// Has no effect in any other state.
    pub fn clear_fault(&self) {
        let mut state = self.state.lock();
        if state.status == DeviceStatus::Error {
            state.status = DeviceStatus::Ready;
        }
    }

    /// Block until a request is available or the queue is stopped
    ///
    /// Marks the device `Busy` when a request is handed out and `Ready`
    /// while idle or on exit.
    pub(crate) fn take(&self) -> Option<Request> {
        let mut state = self.state.lock();
        loop {
            if state.stopped {
                state.status = DeviceStatus::Ready;
                return None;
            }
            if let Some(request) = state.pending.pop_front() {
                state.status = DeviceStatus::Busy;
                return Some(request);
            }
            state.status = DeviceStatus::Ready;
            self.not_empty.wait(&mut state);
        }
    }

    /// Record completion of the request last handed out by [`take`](Self::take)
    pub(crate) fn complete(&self) {
        self.state.lock().processed += 1;
    }
}
