//! Queue item definition and types

use crate::error::QueueError;
use crate::state::ItemState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Unique identifier for a queue item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random ItemId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Outcome delivered to every waiter of an item
pub type Settlement<R> = std::result::Result<R, QueueError>;
pub(crate) type Waiter<R> = oneshot::Sender<Settlement<R>>;

/// One unit of work in flight
///
/// Every caller attached to the item holds the receiving half of one waiter.
/// `settle` consumes the item, so each waiter fires exactly once.
#[derive(Debug)]
pub struct QueueItem<P, R> {
    /// Unique item identifier
    pub id: ItemId,

    /// Input handed to the processor
    pub payload: P,

    /// Key this item is registered under in the coalescing index
    pub coalesce_key: Option<String>,

    /// Current state
    pub state: ItemState,

    /// When the item was enqueued
    pub enqueued_at: DateTime<Utc>,

    /// When the processor started
    pub started_at: Option<DateTime<Utc>>,

    /// When the processor settled
    pub completed_at: Option<DateTime<Utc>>,

    waiters: Vec<Waiter<R>>,
}

impl<P, R: Clone> QueueItem<P, R> {
    /// Create a pending item together with its first waiter
    pub(crate) fn new(
        payload: P,
        coalesce_key: Option<String>,
    ) -> (Self, oneshot::Receiver<Settlement<R>>) {
        let (tx, rx) = oneshot::channel();
        let item = Self {
            id: ItemId::new(),
            payload,
            coalesce_key,
            state: ItemState::Pending,
            enqueued_at: Utc::now(),
            started_at: None,
            completed_at: None,
            waiters: vec![tx],
        };
        (item, rx)
    }

    /// Register another caller for the same settlement
    pub(crate) fn attach(&mut self) -> oneshot::Receiver<Settlement<R>> {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        rx
    }

    /// Number of callers waiting on this item
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    /// Mark item as processing
    pub fn start(&mut self) {
        self.state = ItemState::Processing;
        self.started_at = Some(Utc::now());
    }

    /// Mark item as completed successfully
    pub fn complete(&mut self) {
        self.state = ItemState::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark item as failed
    pub fn fail(&mut self) {
        self.state = ItemState::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Processing duration in milliseconds, once started
    pub fn duration_ms(&self) -> Option<u64> {
        let start = self.started_at?;
        let end = self.completed_at.unwrap_or_else(Utc::now);
        Some((end - start).num_milliseconds().max(0) as u64)
    }

    /// Deliver the outcome to every waiter, in registration order
    ///
    /// Waiters whose caller has gone away are skipped.
    pub(crate) fn settle(self, outcome: Settlement<R>) {
        for waiter in self.waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    pub fn snapshot(&self) -> QueueItemSnapshot {
        QueueItemSnapshot {
            id: self.id,
            coalesce_key: self.coalesce_key.clone(),
            state: self.state,
            enqueued_at: self.enqueued_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            waiters: self.waiters.len(),
        }
    }
}

/// Read-only view of an item, safe to hand out of the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemSnapshot {
    pub id: ItemId,
    pub coalesce_key: Option<String>,
    pub state: ItemState,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub waiters: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_reaches_every_waiter() {
        let (mut item, first) = QueueItem::<&str, u32>::new("payload", Some("k".into()));
        let second = item.attach();
        assert_eq!(item.waiter_count(), 2);

        item.start();
        item.complete();
        item.settle(Ok(7));

        assert_eq!(first.await.unwrap(), Ok(7));
        assert_eq!(second.await.unwrap(), Ok(7));
    }

    #[tokio::test]
    async fn test_settle_skips_dropped_waiter() {
        let (mut item, first) = QueueItem::<(), u32>::new((), None);
        let second = item.attach();
        drop(first);

        item.settle(Err(QueueError::Processing("boom".into())));
        assert_eq!(
            second.await.unwrap(),
            Err(QueueError::Processing("boom".into()))
        );
    }

    #[test]
    fn test_transitions_record_timestamps() {
        let (mut item, _rx) = QueueItem::<(), u32>::new((), None);
        assert!(item.state.is_pending());
        assert!(item.duration_ms().is_none());

        item.start();
        assert!(item.state.is_processing());
        assert!(item.started_at.is_some());

        item.fail();
        assert!(item.state.is_terminal());
        assert!(item.completed_at.is_some());
        assert!(item.duration_ms().is_some());
    }
}
