//! Queue registry - one queue per logical name
//!
//! Owned by the application context rather than living in a global, so each
//! test can build a fresh one. Shutdown drains every registered queue.

use crate::traits::{QueueHandle, QueueStats};
use coalesce_foundation::{Error, Result};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
pub struct QueueRegistry {
    queues: RwLock<HashMap<String, Arc<dyn QueueHandle>>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queue under its own name; names are unique
    pub fn register(&self, queue: Arc<dyn QueueHandle>) -> Result<()> {
        let name = queue.name().to_string();
        let mut queues = self.queues.write();
        if queues.contains_key(&name) {
            return Err(Error::Config(format!("queue '{}' already registered", name)));
        }
        queues.insert(name, queue);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn QueueHandle>> {
        self.queues.read().get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.queues.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.read().is_empty()
    }

    pub fn stats_by_name(&self) -> BTreeMap<String, QueueStats> {
        self.queues
            .read()
            .iter()
            .map(|(name, queue)| (name.clone(), queue.stats()))
            .collect()
    }

    /// Wait until every registered queue is idle
    pub async fn drain_all(&self) {
        let queues = self.handles();
        info!(count = queues.len(), "Draining queues");
        join_all(queues.iter().map(|queue| queue.drain())).await;
        info!("All queues drained");
    }

    pub fn clear_all(&self) {
        for queue in self.handles() {
            queue.clear();
        }
    }

    // Snapshot so no lock is held across an await
    fn handles(&self) -> Vec<Arc<dyn QueueHandle>> {
        self.queues.read().values().cloned().collect()
    }
}

impl std::fmt::Debug for QueueRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueRegistry")
            .field("queues", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{CoalescingQueue, QueueBuilder, QueueConfig};

    fn queue(name: &str) -> CoalescingQueue<u32, u32> {
        QueueBuilder::new(QueueConfig::new(name)).build(|n: u32| async move { Ok(n * 2) })
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = QueueRegistry::new();
        registry.register(Arc::new(queue("a"))).unwrap();
        registry.register(Arc::new(queue("b"))).unwrap();

        let err = registry.register(Arc::new(queue("a"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_drain_all_and_stats() {
        let registry = QueueRegistry::new();
        let q = queue("double");
        registry.register(Arc::new(q.clone())).unwrap();

        assert_eq!(q.enqueue(21).await, Ok(42));
        registry.drain_all().await;

        let stats = registry.stats_by_name();
        assert_eq!(stats["double"].completed, 1);
        assert_eq!(registry.get("double").unwrap().pending_count(), 0);

        registry.clear_all();
        assert_eq!(registry.stats_by_name()["double"].completed, 0);
    }
}
