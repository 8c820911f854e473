//! The injected `(level, message)` logging capability
//!
//! Core components hold an `Arc<dyn LogSink>` and report through it. They
//! never format timestamps or pick a transport; that is the sink's job.

use parking_lot::Mutex;

use crate::level::Level;

/// Trait for components that accept log records
pub trait LogSink: Send + Sync {
    /// Record a message at `level`
    fn log(&self, level: Level, message: &str);

    /// Whether a record at `level` would be kept
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    /// Log a debug message
    fn debug(&self, message: &str) {
        if self.enabled(Level::Debug) {
            self.log(Level::Debug, message);
        }
    }

    /// Log an info message
    fn info(&self, message: &str) {
        if self.enabled(Level::Info) {
            self.log(Level::Info, message);
        }
    }

    /// Log a warning message
    fn warn(&self, message: &str) {
        if self.enabled(Level::Warn) {
            self.log(Level::Warn, message);
        }
    }

    /// Log an error message
    fn error(&self, message: &str) {
        if self.enabled(Level::Error) {
            self.log(Level::Error, message);
        }
    }
}

/// No-op sink that discards all records
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _level: Level, _message: &str) {}

    fn enabled(&self, _level: Level) -> bool {
        false
    }
}

/// Sink that forwards records to `tracing`
#[derive(Debug, Clone)]
pub struct TracingSink {
    component: &'static str,
    min_level: Level,
}

impl TracingSink {
    /// Create a sink tagging every event with `component`
    #[must_use]
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            min_level: Level::Trace,
        }
    }

    /// Drop records below `level` before they reach the subscriber
    #[must_use = "builder methods must be chained or built"]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Component name attached to events
    #[must_use]
    pub fn component(&self) -> &'static str {
        self.component
    }
}

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        let component = self.component;
        match level {
            Level::Trace => tracing::trace!(component, "{message}"),
            Level::Debug => tracing::debug!(component, "{message}"),
            Level::Info => tracing::info!(component, "{message}"),
            Level::Warn => tracing::warn!(component, "{message}"),
            Level::Error => tracing::error!(component, "{message}"),
        }
    }

    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }
}

/// A captured log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Severity
    pub level: Level,
    /// Message text
    pub message: String,
}

/// Sink that keeps every record in memory
#[derive(Debug, Default)]
pub struct CaptureSink {
    records: Mutex<Vec<Record>>,
}

impl CaptureSink {
    /// Create an empty capture sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Messages recorded at exactly `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether any record at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Number of records captured
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been captured
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Forget everything captured so far
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for CaptureSink {
    fn log(&self, level: Level, message: &str) {
        self.records.lock().push(Record {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn capture_sink_records_in_order() {
        let sink = CaptureSink::new();
        sink.info("first");
        sink.warn("second");
        sink.error("third");

        assert_eq!(
            sink.records(),
            vec![
                Record {
                    level: Level::Info,
                    message: "first".to_string()
                },
                Record {
                    level: Level::Warn,
                    message: "second".to_string()
                },
                Record {
                    level: Level::Error,
                    message: "third".to_string()
                },
            ]
        );
        assert!(sink.contains(Level::Warn, "sec"));
        assert!(!sink.contains(Level::Info, "sec"));
        assert_eq!(sink.messages_at(Level::Error), vec!["third".to_string()]);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn noop_sink_is_disabled() {
        let sink = NoopSink;
        assert!(!sink.enabled(Level::Error));
        sink.error("dropped");
    }

    #[test]
    fn tracing_sink_respects_min_level() {
        let sink = TracingSink::new("test").with_min_level(Level::Warn);
        assert!(!sink.enabled(Level::Info));
        assert!(sink.enabled(Level::Error));
        assert_eq!(sink.component(), "test");
        // No subscriber installed: must not panic.
        sink.warn("no subscriber");
    }

    #[test]
    fn sinks_are_object_safe() {
        let sink: Arc<dyn LogSink> = Arc::new(CaptureSink::new());
        sink.debug("through a trait object");
    }
}
