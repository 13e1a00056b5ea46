//! Lightweight LRU Cache implementation
//!
//! Order is tracked with a monotonically increasing access counter. Both reads
//! and writes refresh an entry; only `peek`/`contains` leave the order alone.

use std::collections::HashMap;
use std::hash::Hash;

/// A simple LRU (Least Recently Used) cache
///
/// Entry count never exceeds `capacity`. Inserting a new key into a full cache
/// evicts exactly one entry, the one accessed longest ago.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Storage for cached items
    entries: HashMap<K, LruEntry<V>>,
    /// Maximum number of entries
    capacity: usize,
    /// Access counter for LRU tracking
    access_counter: u64,
    /// Entries dropped to make room
    evictions: u64,
}

#[derive(Debug)]
struct LruEntry<V> {
    value: V,
    last_access: u64,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a new LRU cache with the given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            access_counter: 0,
            evictions: 0,
        }
    }

    /// Get a reference to a cached value
    ///
    /// Marks the entry as most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.access_counter += 1;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_access = self.access_counter;
            Some(&entry.value)
        } else {
            None
        }
    }

    /// Read a value without touching its position
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Check if a key exists without updating access time
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite a value, marking it most recently used
    ///
    /// Returns the previous value for an existing key. A new key arriving at
    /// capacity evicts the least recently used entry first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.access_counter += 1;

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_access = self.access_counter;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.entries.insert(
            key,
            LruEntry {
                value,
                last_access: self.access_counter,
            },
        );

        None
    }

    /// Remove a specific key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.evictions = 0;
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of evictions since creation or the last clear
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Evict the least recently used entry
    fn evict_lru(&mut self) -> Option<K> {
        let lru_key = self.find_lru_key()?;
        self.entries.remove(&lru_key);
        self.evictions += 1;
        Some(lru_key)
    }

    /// Find the key with the oldest access time
    fn find_lru_key(&self) -> Option<K> {
        self.entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_basic() {
        let mut cache = LruCache::new(3);

        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_evicts_first_inserted_without_reads() {
        let mut cache = LruCache::new(3);

        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        cache.insert("d", 4);

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"d"));
        assert_eq!(cache.evictions(), 1);
    }

    #[test]
    fn test_get_refreshes_order() {
        let mut cache = LruCache::new(3);

        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        // Access "a" to make it more recent
        cache.get(&"a");

        // Insert "d", should evict "b" (least recently used)
        cache.insert("d", 4);

        assert_eq!(cache.peek(&"a"), Some(&1));
        assert_eq!(cache.peek(&"b"), None); // evicted
        assert_eq!(cache.peek(&"d"), Some(&4));
    }

    #[test]
    fn test_overwrite_refreshes_without_evicting() {
        let mut cache = LruCache::new(2);

        cache.insert("a", 1);
        cache.insert("b", 2);
        let old = cache.insert("a", 10);

        assert_eq!(old, Some(1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.evictions(), 0);

        // "b" is now the oldest
        cache.insert("c", 3);
        assert!(!cache.contains(&"b"));
        assert_eq!(cache.peek(&"a"), Some(&10));
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut cache = LruCache::new(2);

        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.peek(&"a"), Some(&1));

        cache.insert("c", 3);
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = LruCache::new(0);
        cache.insert("a", 1);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = LruCache::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");

        assert_eq!(cache.remove(&3), Some("c"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.evictions(), 0);
    }
}
