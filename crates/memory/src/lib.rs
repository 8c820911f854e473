//! # kernsim-memory
//!
//! Fixed-size memory pool allocator for the kernsim simulation.
//!
//! One contiguous buffer is carved into regions tracked by a
//! [`BlockLedger`]. Allocation is first-fit with splitting; deallocation
//! marks the region free and coalesces it with free neighbours.
//!
//! ## Quick Start
//!
//! ```rust
//! use kernsim_memory::prelude::*;
//!
//! let mut pool = MemoryPool::new(1024 * 1024)?;
//! let handle = pool.allocate(1024)?.expect("non-zero size");
//! assert_eq!(pool.stats().used, 1024);
//!
//! pool.deallocate(handle);
//! assert_eq!(pool.stats().region_count, 1);
//! # Ok::<(), kernsim_memory::MemoryError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ledger`]: ordered region sequence and its invariants
//! - [`pool`]: the allocator and its [`Handle`]s
//! - [`thread_safe`]: single-lock wrapper for shared use
//! - [`stats`]: read-only snapshots
//! - Errors via the [`error`] module; events go to an injected
//!   `kernsim_log::LogSink`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod stats;
pub mod thread_safe;

pub use crate::config::{CoalescePolicy, DEFAULT_POOL_CAPACITY, PoolConfig};
pub use crate::error::{MemoryError, MemoryResult};
pub use crate::ledger::{BlockLedger, REGION_OVERHEAD, Region};
pub use crate::pool::{Handle, MemoryPool};
pub use crate::stats::PoolStats;
pub use crate::thread_safe::ThreadSafePool;

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::config::{CoalescePolicy, PoolConfig};
    pub use crate::error::{MemoryError, MemoryResult};
    pub use crate::pool::{Handle, MemoryPool};
    pub use crate::stats::PoolStats;
    pub use crate::thread_safe::ThreadSafePool;
}
