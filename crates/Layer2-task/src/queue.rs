//! Coalescing Queue - FIFO scheduling with bounded concurrency and single-flight
//!
//! Features:
//! - Strict arrival-order dispatch, at most `concurrency` items processing
//! - Requests sharing a coalesce key attach to the one item in flight
//! - Failures settle only the affected item; scheduling carries on
//! - Event-driven drain for orderly shutdown
//!
//! All bookkeeping (FIFO, processing set, coalescing index, counters) lives in
//! one `QueueState` behind one mutex. Each step below takes the lock once, so
//! a coalescing lookup and the insert that follows it can never interleave
//! with another request for the same key. The processor itself always runs
//! outside the lock.

use crate::error::QueueError;
use crate::event::QueueEvent;
use crate::item::{ItemId, QueueItem, QueueItemSnapshot, Settlement};
use crate::traits::{QueueHandle, QueueStats, WorkQueue};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, Notify};
use tracing::{debug, info, warn};

/// Processor closure: payload in, result or error out
pub type Processor<P, R> =
    Arc<dyn Fn(P) -> BoxFuture<'static, coalesce_foundation::Result<R>> + Send + Sync>;

/// Derives the coalesce key from a payload
pub type KeyFn<P> = Arc<dyn Fn(&P) -> String + Send + Sync>;

/// Configuration for a queue
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Name used in logs, events and the registry
    pub name: String,

    /// Maximum simultaneously-processing items
    pub concurrency: usize,

    /// Buffered events per subscriber before it lags
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            concurrency: 1,
            event_capacity: 256,
        }
    }
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the concurrency limit (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    total_enqueued: u64,
    completed: u64,
    failed: u64,
    coalesced: u64,
}

struct QueueState<P, R> {
    /// Every live item, pending or processing
    items: HashMap<ItemId, QueueItem<P, R>>,
    /// FIFO of pending item ids
    pending: VecDeque<ItemId>,
    /// Items whose processor is running
    processing: HashSet<ItemId>,
    /// Coalesce key -> the single live item for that key
    coalescing: HashMap<String, ItemId>,
    counters: Counters,
}

impl<P, R> QueueState<P, R> {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
            pending: VecDeque::new(),
            processing: HashSet::new(),
            coalescing: HashMap::new(),
            counters: Counters::default(),
        }
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.processing.is_empty()
    }

    fn stats(&self) -> QueueStats {
        let c = self.counters;
        QueueStats {
            pending: self.pending.len(),
            processing: self.processing.len(),
            completed: c.completed,
            failed: c.failed,
            coalesced: c.coalesced,
            total_enqueued: c.total_enqueued,
            total_processed: c.completed + c.failed,
        }
    }
}

struct QueueInner<P, R> {
    config: QueueConfig,
    processor: Processor<P, R>,
    key_fn: Option<KeyFn<P>>,
    state: Mutex<QueueState<P, R>>,
    idle: Notify,
    events: broadcast::Sender<QueueEvent>,
}

/// Builder for [`CoalescingQueue`]
pub struct QueueBuilder<P> {
    config: QueueConfig,
    key_fn: Option<KeyFn<P>>,
}

impl<P> QueueBuilder<P>
where
    P: Clone + Send + 'static,
{
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            key_fn: None,
        }
    }

    /// Coalesce requests whose payloads map to the same key
    pub fn coalesce_by<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&P) -> String + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(key_fn));
        self
    }

    pub fn build<R, F, Fut>(self, processor: F) -> CoalescingQueue<P, R>
    where
        R: Clone + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = coalesce_foundation::Result<R>> + Send + 'static,
    {
        let processor: Processor<P, R> = Arc::new(move |payload| processor(payload).boxed());
        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));

        CoalescingQueue {
            inner: Arc::new(QueueInner {
                config: self.config,
                processor,
                key_fn: self.key_fn,
                state: Mutex::new(QueueState::new()),
                idle: Notify::new(),
                events,
            }),
        }
    }
}

/// FIFO work queue with bounded concurrency and request coalescing
///
/// Cloning is cheap and every clone drives the same queue.
pub struct CoalescingQueue<P, R> {
    inner: Arc<QueueInner<P, R>>,
}

impl<P, R> Clone for CoalescingQueue<P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, R> CoalescingQueue<P, R>
where
    P: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn concurrency(&self) -> usize {
        self.inner.config.concurrency
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events.subscribe()
    }

    /// Submit a payload and wait for its settlement
    ///
    /// If an item with the same coalesce key is pending or processing, the
    /// caller attaches to it instead of creating new work.
    pub async fn enqueue(&self, payload: P) -> Settlement<R> {
        let (rx, created) = self.submit(payload);
        if created {
            self.pump();
        }
        rx.await
            .unwrap_or_else(|_| Err(QueueError::Abandoned(self.name().to_string())))
    }

    fn submit(&self, payload: P) -> (oneshot::Receiver<Settlement<R>>, bool) {
        let key = self.inner.key_fn.as_ref().map(|key_fn| key_fn(&payload));

        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        if let Some(key) = &key {
            if let Some(id) = state.coalescing.get(key).copied() {
                if let Some(item) = state.items.get_mut(&id) {
                    let rx = item.attach();
                    state.counters.coalesced += 1;
                    debug!(
                        queue = %self.name(),
                        item_id = %id,
                        waiters = item.waiter_count(),
                        "Coalesced request onto in-flight item"
                    );
                    self.emit(QueueEvent::Coalesced {
                        queue: self.name().to_string(),
                        item_id: id,
                        waiters: item.waiter_count(),
                    });
                    return (rx, false);
                }
            }
        }

        let (item, rx) = QueueItem::new(payload, key.clone());
        let id = item.id;
        if let Some(key) = &key {
            state.coalescing.insert(key.clone(), id);
        }
        state.items.insert(id, item);
        state.pending.push_back(id);
        state.counters.total_enqueued += 1;

        debug!(
            queue = %self.name(),
            item_id = %id,
            pending = state.pending.len(),
            "Enqueued item"
        );
        self.emit(QueueEvent::Enqueued {
            queue: self.name().to_string(),
            item_id: id,
            key,
        });

        (rx, true)
    }

    /// Move FIFO heads into free processing slots
    fn pump(&self) {
        let launches: Vec<(ItemId, P)> = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            let mut launches = Vec::new();

            while state.processing.len() < self.inner.config.concurrency {
                let Some(id) = state.pending.pop_front() else {
                    break;
                };
                let Some(item) = state.items.get_mut(&id) else {
                    continue;
                };
                item.start();
                state.processing.insert(id);
                launches.push((id, item.payload.clone()));
            }
            launches
        };

        for (id, payload) in launches {
            debug!(queue = %self.name(), item_id = %id, "Dispatching item");
            self.emit(QueueEvent::Started {
                queue: self.name().to_string(),
                item_id: id,
            });

            let queue = self.clone();
            tokio::spawn(async move {
                queue.run(id, payload).await;
            });
        }
    }

    async fn run(&self, id: ItemId, payload: P) {
        let processor = Arc::clone(&self.inner.processor);
        let outcome = AssertUnwindSafe(async move { processor(payload).await })
            .catch_unwind()
            .await;

        let settlement = match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(QueueError::Processing(e.to_string())),
            Err(_) => Err(QueueError::Processing("processor panicked".to_string())),
        };

        self.finish(id, settlement);
        self.pump();
    }

    /// Retire a processed item and notify its waiters
    fn finish(&self, id: ItemId, settlement: Settlement<R>) {
        let (item, idle) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            state.processing.remove(&id);
            let Some(mut item) = state.items.remove(&id) else {
                return;
            };
            if let Some(key) = &item.coalesce_key {
                if state.coalescing.get(key) == Some(&id) {
                    state.coalescing.remove(key);
                }
            }

            match &settlement {
                Ok(_) => {
                    item.complete();
                    state.counters.completed += 1;
                    let duration_ms = item.duration_ms().unwrap_or(0);
                    debug!(queue = %self.name(), item_id = %id, duration_ms, "Item completed");
                    self.emit(QueueEvent::Completed {
                        queue: self.name().to_string(),
                        item_id: id,
                        duration_ms,
                    });
                }
                Err(e) => {
                    item.fail();
                    state.counters.failed += 1;
                    warn!(queue = %self.name(), item_id = %id, error = %e, "Item failed");
                    self.emit(QueueEvent::Failed {
                        queue: self.name().to_string(),
                        item_id: id,
                        error: e.to_string(),
                    });
                }
            }

            (item, state.is_idle())
        };

        item.settle(settlement);
        if idle {
            self.inner.idle.notify_waiters();
        }
    }

    /// Resolve once nothing is pending and nothing is processing
    ///
    /// New enqueues are not blocked; stop traffic first for a final drain.
    pub async fn drain(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.state.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Reject every pending item with [`QueueError::Cleared`]
    ///
    /// Empties the FIFO and the coalescing index and resets all counters.
    /// Items already processing run to completion untouched.
    pub fn clear(&self) {
        let (cleared, idle) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            let ids: Vec<ItemId> = state.pending.drain(..).collect();
            let cleared: Vec<QueueItem<P, R>> = ids
                .iter()
                .filter_map(|id| state.items.remove(id))
                .collect();
            state.coalescing.clear();
            state.counters = Counters::default();

            (cleared, state.is_idle())
        };

        let rejected = cleared.len();
        for item in cleared {
            item.settle(Err(QueueError::Cleared(self.name().to_string())));
        }

        if rejected > 0 {
            warn!(queue = %self.name(), rejected, "Rejected pending items on clear");
        }
        info!(queue = %self.name(), "Queue cleared");
        self.emit(QueueEvent::Cleared {
            queue: self.name().to_string(),
            rejected,
        });

        if idle {
            self.inner.idle.notify_waiters();
        }
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.state.lock().stats()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    pub fn processing_count(&self) -> usize {
        self.inner.state.lock().processing.len()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().is_idle()
    }

    /// Pending items in FIFO order, then processing items
    pub fn snapshot(&self) -> Vec<QueueItemSnapshot> {
        let state = self.inner.state.lock();
        let pending = state.pending.iter();
        let processing = state.processing.iter();
        pending
            .chain(processing)
            .filter_map(|id| state.items.get(id))
            .map(QueueItem::snapshot)
            .collect()
    }

    fn emit(&self, event: QueueEvent) {
        // Err only means nobody is listening
        let _ = self.inner.events.send(event);
    }
}

#[async_trait]
impl<P, R> QueueHandle for CoalescingQueue<P, R>
where
    P: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    fn name(&self) -> &str {
        &self.inner.config.name
    }

    async fn drain(&self) {
        CoalescingQueue::drain(self).await
    }

    fn clear(&self) {
        CoalescingQueue::clear(self)
    }

    fn stats(&self) -> QueueStats {
        CoalescingQueue::stats(self)
    }

    fn pending_count(&self) -> usize {
        CoalescingQueue::pending_count(self)
    }

    fn processing_count(&self) -> usize {
        CoalescingQueue::processing_count(self)
    }
}

#[async_trait]
impl<P, R> WorkQueue<P, R> for CoalescingQueue<P, R>
where
    P: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    async fn enqueue(&self, payload: P) -> Settlement<R> {
        CoalescingQueue::enqueue(self, payload).await
    }
}
