//! # coalesce-foundation
//!
//! Foundation layer for Coalesce:
//! - Error: error taxonomy and client-facing error codes
//! - Config: ServiceConfig (defaults, TOML file, environment)
//! - Cache: ResultCache abstraction, in-memory LRU backend, digest functions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Layer4-cli      coalesce binary (process/serve/bench)  │
//! │        │                                                │
//! │        ▼                                                │
//! │  Layer3-service  Service ──► Repository (cache-aside)   │
//! │        │                                                │
//! │        ▼                                                │
//! │  Layer2-task     CoalescingQueue (FIFO + single-flight) │
//! │        │                                                │
//! │        ▼                                                │
//! │  Layer1-foundation  ResultCache / Config / Error        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, ErrorCode, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::ServiceConfig;

// ============================================================================
// Cache
// ============================================================================
pub use cache::{sha256_hex, CacheStats, DigestAlgorithm, LruCache, MemoryCache, ResultCache};
