//! # Coalesce Cache System
//!
//! Result cache for computed digests.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  ResultCache (trait)                          │
//! │  get / set / clear / stats                    │
//! ├───────────────────────────────────────────────┤
//! │  MemoryCache          (remote backends)       │
//! │  └── LruCache         implement the same      │
//! │      strict LRU       trait                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Entries never expire: a digest for a given text never changes, so the only
//! way out of the cache is LRU eviction or an explicit clear.
//!
//! ## Modules
//!
//! - [`traits`] - Cache abstraction and statistics
//! - [`memory`] - In-memory backend
//! - [`util`] - Utilities (LRU cache, digests)

pub mod memory;
pub mod traits;
pub mod util;

pub use memory::MemoryCache;
pub use traits::{CacheStats, ResultCache};
pub use util::{sha256_hex, DigestAlgorithm, LruCache};
