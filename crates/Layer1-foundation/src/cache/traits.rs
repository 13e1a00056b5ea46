//! Cache abstraction
//!
//! Backends store immutable string results keyed by the raw input. The
//! in-memory [`MemoryCache`](super::MemoryCache) is the default; a networked
//! store implements the same trait and reports connectivity problems as
//! [`Error::Backend`](crate::Error::Backend).

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Hit/miss counters plus the current entry count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Live entries. Backends that cannot count cheaply report 0.
    pub size: usize,
}

impl CacheStats {
    /// Hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Backend identifier for logs
    fn backend(&self) -> &'static str;

    /// Look up a value; counts a hit or a miss
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Drop every entry and reset counters
    async fn clear(&self) -> Result<()>;

    fn stats(&self) -> CacheStats;
}
