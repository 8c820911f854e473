//! # kernsim-log
//!
//! Leveled logging for the kernsim workspace.
//!
//! Two halves live here:
//! - The [`LogSink`] capability: a `(level, message)` sink that core
//!   components receive by injection. Components never know how (or
//!   whether) the messages get rendered.
//! - The subscriber bootstrap ([`init`], [`Config`]) used by binaries to
//!   install a `tracing` subscriber. [`TracingSink`] bridges the two.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use kernsim_log::{Config, LogSink, TracingSink};
//!
//! let _guard = kernsim_log::init(Config::development())?;
//!
//! let sink: Arc<dyn LogSink> = Arc::new(TracingSink::new("pool"));
//! sink.info("pool ready");
//! # Ok::<(), kernsim_log::LogError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]

mod builder;
mod config;
mod error;
mod level;
mod sink;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, Format, Writer};
pub use error::{LogError, LogResult};
pub use level::Level;
pub use sink::{CaptureSink, LogSink, NoopSink, Record, TracingSink};

// Re-export tracing so binaries don't need a direct dependency for the macros.
pub use tracing::{debug, error, info, trace, warn};

/// Build and install the global subscriber described by `config`.
///
/// Keep the returned guard alive for as long as logging is needed.
pub fn init(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
