//! In-memory result cache backed by [`LruCache`]

use super::traits::{CacheStats, ResultCache};
use super::util::LruCache;
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Process-local LRU cache with hit/miss accounting
///
/// All state sits behind one mutex, so a lookup and its counter update, or an
/// insert and its eviction, are never observed half-done.
#[derive(Debug)]
pub struct MemoryCache {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    entries: LruCache<String, String>,
    hits: u64,
    misses: u64,
}

impl MemoryCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                entries: LruCache::new(max_size),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().entries.capacity()
    }

    /// Check for a key without counting or refreshing it
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains(&key.to_string())
    }

    fn get_sync(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();
        match state.entries.get(&key.to_string()).cloned() {
            Some(value) => {
                state.hits += 1;
                trace!(key_len = key.len(), "Cache hit");
                Some(value)
            }
            None => {
                state.misses += 1;
                trace!(key_len = key.len(), "Cache miss");
                None
            }
        }
    }

    fn set_sync(&self, key: &str, value: String) {
        let mut state = self.state.lock();
        let before = state.entries.evictions();
        state.entries.insert(key.to_string(), value);
        if state.entries.evictions() > before {
            debug!(size = state.entries.len(), "Evicted least recently used entry");
        }
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_sync(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.set_sync(key, value);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        debug!("Cache cleared");
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            size: state.entries.len(),
        }
    }
}
