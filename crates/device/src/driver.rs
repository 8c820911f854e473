//! Driver owning the request queue and its processing thread

use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;

use kernsim_log::{LogSink, NoopSink};
use parking_lot::Mutex;

use crate::config::DeviceConfig;
use crate::error::{DeviceError, DeviceResult};
use crate::queue::RequestQueue;
use crate::stats::DeviceStats;
use crate::status::DeviceStatus;
use crate::worker::{ProcessingLoop, RequestObserver};

/// Simulated block device
///
/// Producers call [`submit`](Self::submit) from any thread; a single
/// background thread started by [`start`](Self::start) drains the queue in
/// FIFO order. Dropping the driver stops and joins that thread.
///
/// # Example
/// ```
/// use kernsim_device::{DeviceConfig, DeviceDriver, DeviceStatus};
///
/// let driver = DeviceDriver::new(DeviceConfig::instant())?;
/// driver.start()?;
/// assert!(driver.submit("read", 512));
/// driver.shutdown()?;
/// assert_eq!(driver.device_status(), DeviceStatus::Ready);
/// # Ok::<(), kernsim_device::DeviceError>(())
/// ```
pub struct DeviceDriver {
    queue: Arc<RequestQueue>,
    config: DeviceConfig,
    observer: Option<Arc<dyn RequestObserver>>,
    sink: Arc<dyn LogSink>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceDriver {
    /// Create a stopped driver with an empty queue
    pub fn new(config: DeviceConfig) -> DeviceResult<Self> {
        config.validate()?;
        Ok(Self {
            queue: Arc::new(RequestQueue::new(config.queue_capacity)),
            config,
            observer: None,
            sink: Arc::new(NoopSink),
            worker: Mutex::new(None),
        })
    }

    /// Report driver events to `sink`
    #[must_use = "builder methods must be chained or built"]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Call `observer` after every completed request
    #[must_use = "builder methods must be chained or built"]
    pub fn with_observer(mut self, observer: impl RequestObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Spawn the processing thread
    ///
    /// A driver that was stopped can be started again; requests left in the
    /// queue are picked up by the new thread.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::AlreadyRunning`] if the thread is still alive
    /// - [`DeviceError::Spawn`] if the OS refuses a new thread
    pub fn start(&self) -> DeviceResult<()> {
        let mut worker = self.worker.lock();
        if let Some(handle) = worker.take() {
            if !handle.is_finished() {
                *worker = Some(handle);
                return Err(DeviceError::AlreadyRunning);
            }
            if handle.join().is_err() {
                self.sink.error("previous processing loop panicked");
            }
        }

        self.queue.resume();
        let processing = ProcessingLoop {
            queue: Arc::clone(&self.queue),
            latency: self.config.latency,
            observer: self.observer.clone(),
            sink: Arc::clone(&self.sink),
        };
        let handle = processing.spawn().map_err(|e| {
            let err = DeviceError::spawn(&e);
            self.sink.error(&err.to_string());
            err
        })?;
        *worker = Some(handle);
        drop(worker);

        self.sink.info(&format!(
            "device started (queue capacity {})",
            self.queue.capacity()
        ));
        Ok(())
    }

    /// Signal the processing thread to exit without waiting for it
    ///
    /// A request already in flight finishes first; pending ones stay queued.
    pub fn stop(&self) {
        self.queue.stop();
    }

    /// Stop and join the processing thread
    ///
    /// Returns immediately if the driver was never started.
    ///
    /// # Errors
    ///
    /// [`DeviceError::WorkerPanicked`] if the thread panicked.
    pub fn shutdown(&self) -> DeviceResult<()> {
        self.queue.stop();
        let Some(handle) = self.worker.lock().take() else {
            return Ok(());
        };

        if handle.join().is_err() {
            self.sink.error("processing loop panicked");
            return Err(DeviceError::WorkerPanicked);
        }
        self.sink.info(&format!(
            "device stopped ({} requests left in queue)",
            self.queue.depth()
        ));
        Ok(())
    }

    /// Whether the processing thread is alive
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Enqueue a request, returning `false` if the queue is full
    pub fn submit(&self, operation: impl Into<String>, payload_size: usize) -> bool {
        self.try_submit(operation, payload_size).is_ok()
    }

    /// Enqueue a request and return its id
    ///
    /// # Errors
    ///
    /// [`DeviceError::QueueFull`] when the queue is at capacity.
    pub fn try_submit(&self, operation: impl Into<String>, payload_size: usize) -> DeviceResult<u64> {
        let operation = operation.into();
        match self.queue.try_submit(operation.as_str(), payload_size) {
            Ok(id) => {
                self.sink.debug(&format!(
                    "queued request {id} ({operation}, {payload_size} bytes)"
                ));
                Ok(id)
            }
            Err(err) => {
                self.sink
                    .warn(&format!("rejected {operation} request: {err}"));
                Err(err)
            }
        }
    }

    pub fn device_status(&self) -> DeviceStatus {
        self.queue.status()
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.depth()
    }

    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn stats(&self) -> DeviceStats {
        self.queue.stats()
    }

    #[inline]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// See [`RequestQueue::inject_fault`]
    pub fn inject_fault(&self) {
        self.sink.warn("fault injected");
        self.queue.inject_fault();
    }

    /// See [`RequestQueue::clear_fault`]
    pub fn clear_fault(&self) {
        self.queue.clear_fault();
    }

    /// Shared handle to the underlying queue
    pub fn queue(&self) -> Arc<RequestQueue> {
        Arc::clone(&self.queue)
    }
}

impl fmt::Debug for DeviceDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDriver")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Drop for DeviceDriver {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            self.sink.error(&format!("shutdown on drop failed: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use kernsim_log::{CaptureSink, Level};

    use super::*;

    #[test]
    fn zero_capacity_rejected() {
        let err = DeviceDriver::new(DeviceConfig::default().with_queue_capacity(0)).unwrap_err();
        assert_eq!(err.code(), "DEV:CONFIG:INVALID");
    }

    #[test]
    fn shutdown_without_start_is_ok() {
        let driver = DeviceDriver::new(DeviceConfig::instant()).unwrap();
        assert!(!driver.is_running());
        assert!(driver.shutdown().is_ok());
    }

    #[test]
    fn rejection_is_logged() {
        let sink = Arc::new(CaptureSink::new());
        let driver = DeviceDriver::new(DeviceConfig::instant().with_queue_capacity(1))
            .unwrap()
            .with_sink(sink.clone());

        assert!(driver.submit("read", 1));
        assert!(!driver.submit("write", 1));
        assert!(sink.contains(Level::Warn, "rejected write request"));
        assert!(sink.contains(Level::Debug, "queued request 0"));
    }

    #[test]
    fn restart_after_shutdown() {
        let driver = DeviceDriver::new(DeviceConfig::instant()).unwrap();
        driver.start().unwrap();
        driver.shutdown().unwrap();
        assert!(!driver.is_running());

        driver.start().unwrap();
        assert!(driver.is_running());
        driver.shutdown().unwrap();
    }
}
