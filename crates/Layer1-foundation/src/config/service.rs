//! Service Config - runtime settings for the cache and computation queue
//!
//! Resolution order: defaults, then an optional TOML file, then environment
//! variables. The result is validated once before anything is built from it.

use crate::cache::DigestAlgorithm;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const ENV_CACHE_MAX_SIZE: &str = "CACHE_MAX_SIZE";
pub const ENV_QUEUE_CONCURRENCY: &str = "QUEUE_CONCURRENCY";
pub const ENV_PROCESSING_DELAY_MS: &str = "PROCESSING_DELAY_MS";
pub const ENV_MAX_INPUT_LENGTH: &str = "MAX_INPUT_LENGTH";
pub const ENV_QUEUE_NAME: &str = "QUEUE_NAME";
pub const ENV_DIGEST_ALGORITHM: &str = "DIGEST_ALGORITHM";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Runtime configuration for the whole service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Maximum number of cached digests
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,

    /// Maximum simultaneously-processing computations
    #[serde(default = "default_queue_concurrency")]
    pub queue_concurrency: usize,

    /// Artificial delay applied to every computation
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,

    /// Maximum accepted input length, in characters
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,

    /// Name the computation queue is registered under
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    #[serde(default)]
    pub digest_algorithm: DigestAlgorithm,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cache_max_size() -> usize {
    1000
}
fn default_queue_concurrency() -> usize {
    1
}
fn default_processing_delay_ms() -> u64 {
    10_000
}
fn default_max_input_length() -> usize {
    10_000
}
fn default_queue_name() -> String {
    "hash-computation".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_max_size: default_cache_max_size(),
            queue_concurrency: default_queue_concurrency(),
            processing_delay_ms: default_processing_delay_ms(),
            max_input_length: default_max_input_length(),
            queue_name: default_queue_name(),
            digest_algorithm: DigestAlgorithm::default(),
            log_level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Defaults, optional file, then process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded service config file");
        Ok(config)
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CACHE_MAX_SIZE) {
            self.cache_max_size = parse_var(ENV_CACHE_MAX_SIZE, &v)?;
        }
        if let Some(v) = lookup(ENV_QUEUE_CONCURRENCY) {
            self.queue_concurrency = parse_var(ENV_QUEUE_CONCURRENCY, &v)?;
        }
        if let Some(v) = lookup(ENV_PROCESSING_DELAY_MS) {
            self.processing_delay_ms = parse_var(ENV_PROCESSING_DELAY_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_INPUT_LENGTH) {
            self.max_input_length = parse_var(ENV_MAX_INPUT_LENGTH, &v)?;
        }
        if let Some(v) = lookup(ENV_QUEUE_NAME) {
            self.queue_name = v;
        }
        if let Some(v) = lookup(ENV_DIGEST_ALGORITHM) {
            self.digest_algorithm = v.parse()?;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
        Ok(())
    }

    /// Reject settings the queue or cache cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cache_max_size == 0 {
            return Err(Error::Config("cacheMaxSize must be at least 1".into()));
        }
        if self.queue_concurrency == 0 {
            return Err(Error::Config("queueConcurrency must be at least 1".into()));
        }
        if self.max_input_length == 0 {
            return Err(Error::Config("maxInputLength must be at least 1".into()));
        }
        if self.queue_name.trim().is_empty() {
            return Err(Error::Config("queueName must not be empty".into()));
        }
        Ok(())
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn with_cache_max_size(mut self, size: usize) -> Self {
        self.cache_max_size = size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.queue_concurrency = concurrency;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.processing_delay_ms = delay_ms;
        self
    }

    pub fn with_max_input_length(mut self, max: usize) -> Self {
        self.max_input_length = max;
        self
    }

    /// Artificial delay as Duration
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}={:?}: {}", key, value, e)))
}
