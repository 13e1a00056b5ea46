//! # coalesce-task
//!
//! Work queue for Coalesce.
//! Schedules expensive computations in FIFO order under a concurrency limit
//! and merges identical concurrent requests into one execution.
//!
//! ## Features
//!
//! - Bounded-concurrency FIFO scheduling
//! - Request coalescing (single-flight) by caller-supplied key
//! - Per-item failure isolation, including processor panics
//! - Drain for graceful shutdown, clear for administrative reset
//! - Lifecycle events and item snapshots for observers
//! - Named queue registry

pub mod error;
pub mod event;
pub mod item;
pub mod queue;
pub mod registry;
pub mod state;
pub mod traits;

pub use error::QueueError;
pub use event::QueueEvent;
pub use item::{ItemId, QueueItem, QueueItemSnapshot, Settlement};
pub use queue::{CoalescingQueue, KeyFn, Processor, QueueBuilder, QueueConfig};
pub use registry::QueueRegistry;
pub use state::ItemState;
pub use traits::{QueueHandle, QueueStats, WorkQueue};
