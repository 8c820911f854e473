//! The background processing loop

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kernsim_log::LogSink;

use crate::config::LatencyModel;
use crate::queue::RequestQueue;
use crate::request::Request;

/// Name given to the processing thread
pub const WORKER_THREAD_NAME: &str = "kernsim-device";

/// Notified after each request completes
///
/// Called on the processing thread, outside the queue lock.
pub trait RequestObserver: Send + Sync {
    fn on_complete(&self, request: &Request, delay: Duration);
}

impl<F> RequestObserver for F
where
    F: Fn(&Request, Duration) + Send + Sync,
{
    fn on_complete(&self, request: &Request, delay: Duration) {
        self(request, delay);
    }
}

/// Single consumer of a [`RequestQueue`]
pub(crate) struct ProcessingLoop {
    pub(crate) queue: Arc<RequestQueue>,
    pub(crate) latency: LatencyModel,
    pub(crate) observer: Option<Arc<dyn RequestObserver>>,
    pub(crate) sink: Arc<dyn LogSink>,
}

impl ProcessingLoop {
    pub(crate) fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || self.run())
    }

    /// Drain requests until the queue is stopped
    ///
    /// The stop flag is checked once per iteration; a request already taken
    /// always runs to completion.
    pub(crate) fn run(self) {
        self.sink.debug("processing loop started");
        while let Some(request) = self.queue.take() {
            let delay = self.latency.delay_for(request.payload_size());
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            if let Some(observer) = &self.observer {
                observer.on_complete(&request, delay);
            }
            self.queue.complete();
            self.sink.debug(&format!(
                "processed request {} ({}, {} bytes) in {delay:?}",
                request.id(),
                request.operation(),
                request.payload_size()
            ));
        }
        self.sink.debug("processing loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use kernsim_log::{CaptureSink, Level};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn run_drains_then_exits_on_stop() {
        let queue = Arc::new(RequestQueue::new(8));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(CaptureSink::new());

        queue.submit("read", 512);
        queue.submit("write", 2048);

        let observer = {
            let seen = Arc::clone(&seen);
            let queue = Arc::clone(&queue);
            move |request: &Request, delay: Duration| {
                seen.lock().push((request.operation().to_owned(), delay));
                if request.id() == 1 {
                    queue.stop();
                }
            }
        };

        ProcessingLoop {
            queue: Arc::clone(&queue),
            latency: LatencyModel::per_kib(Duration::from_micros(10)),
            observer: Some(Arc::new(observer)),
            sink: sink.clone(),
        }
        .run();

        assert_eq!(
            *seen.lock(),
            vec![
                ("read".to_owned(), Duration::ZERO),
                ("write".to_owned(), Duration::from_micros(20)),
            ]
        );
        assert_eq!(queue.stats().processed, 2);
        assert!(sink.contains(Level::Debug, "processed request 1"));
    }
}
