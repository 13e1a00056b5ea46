//! Queue abstraction
//!
//! `QueueHandle` is the object-safe half used by lifecycle code (drain, clear,
//! stats) without knowing payload types. `WorkQueue` adds typed submission.
//! A durable backend may additionally publish payloads to an external log,
//! provided `enqueue` still settles with a result or an error.

use crate::error::QueueError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Aggregate queue statistics
///
/// `pending` and `processing` are live gauges; the rest are counters that only
/// an explicit clear resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: u64,
    pub failed: u64,
    pub coalesced: u64,
    pub total_enqueued: u64,
    /// completed + failed
    pub total_processed: u64,
}

#[async_trait]
pub trait QueueHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve once nothing is pending and nothing is processing
    async fn drain(&self);

    /// Reject pending items, empty the coalescing index, reset counters
    fn clear(&self);

    fn stats(&self) -> QueueStats;

    fn pending_count(&self) -> usize;

    fn processing_count(&self) -> usize;
}

#[async_trait]
pub trait WorkQueue<P, R>: QueueHandle
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Submit a payload and wait for its settlement
    async fn enqueue(&self, payload: P) -> Result<R, QueueError>;
}
