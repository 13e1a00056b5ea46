//! Cache utilities
//!
//! - `LruCache`: bounded map with strict access-order eviction
//! - `DigestAlgorithm`: deterministic digests for computation results

mod hash;
mod lru;

pub use hash::{sha256_hex, DigestAlgorithm};
pub use lru::LruCache;
