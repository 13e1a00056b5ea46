//! # coalesce-service
//!
//! Compute-once, serve-many digest service.
//!
//! ```text
//! process_message(text)
//!   ├─ validate            (empty / too long -> client error, no state touched)
//!   ├─ cache hit?          -> digest, processingTimeMs = 0, fromCache = true
//!   └─ miss -> queue       (coalesced on text, FIFO, bounded concurrency)
//!        └─ delay + digest + cache write -> result fanned out to every waiter
//! ```

pub mod context;
pub mod repository;
pub mod service;
pub mod types;
pub mod validation;

pub use context::AppContext;
pub use repository::{ComputedDigest, HashJob, HashRepository};
pub use service::HashService;
pub use types::{ErrorBody, HealthReport, HealthStatus, ProcessResponse};
pub use validation::validate_input;
