//! Config - service settings
//!
//! - `service.rs` - ServiceConfig (file + environment)

mod service;

pub use service::{
    ServiceConfig, ENV_CACHE_MAX_SIZE, ENV_DIGEST_ALGORITHM, ENV_LOG_LEVEL, ENV_MAX_INPUT_LENGTH,
    ENV_PROCESSING_DELAY_MS, ENV_QUEUE_CONCURRENCY, ENV_QUEUE_NAME,
};
