//! # kernsim-device
//!
//! Simulated block device: a bounded FIFO of I/O requests drained by one
//! background processing loop.
//!
//! ## Quick Start
//!
//! ```rust
//! use kernsim_device::prelude::*;
//!
//! let driver = DeviceDriver::new(DeviceConfig::default())?;
//! driver.start()?;
//!
//! if !driver.submit("read", 512) {
//!     // queue full, try again later
//! }
//! println!("{}", driver.stats());
//!
//! driver.shutdown()?;
//! # Ok::<(), kernsim_device::DeviceError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`queue`]: the bounded queue, device status and stop signal
//! - [`worker`]: the processing loop and completion observers
//! - [`driver`]: lifecycle around one queue and one thread
//! - [`config`]: capacity and the payload-to-latency model

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod driver;
pub mod error;
pub mod queue;
pub mod request;
pub mod stats;
pub mod status;
pub mod worker;

pub use crate::config::{DEFAULT_QUEUE_CAPACITY, DeviceConfig, LatencyModel};
pub use crate::driver::DeviceDriver;
pub use crate::error::{DeviceError, DeviceResult};
pub use crate::queue::RequestQueue;
pub use crate::request::Request;
pub use crate::stats::DeviceStats;
pub use crate::status::DeviceStatus;
pub use crate::worker::{RequestObserver, WORKER_THREAD_NAME};

pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::config::{DeviceConfig, LatencyModel};
    pub use crate::driver::DeviceDriver;
    pub use crate::error::{DeviceError, DeviceResult};
    pub use crate::request::Request;
    pub use crate::stats::DeviceStats;
    pub use crate::status::DeviceStatus;
}
