//! Application context - the explicitly constructed set of shared components
//!
//! One cache, one registry of named queues, one repository and one service per
//! context. Handlers receive the context instead of reaching for globals, and
//! tests build a fresh one each.

use crate::repository::HashRepository;
use crate::service::HashService;
use coalesce_foundation::{MemoryCache, Result, ResultCache, ServiceConfig};
use coalesce_task::QueueRegistry;
use std::sync::Arc;
use tracing::info;

pub struct AppContext {
    config: ServiceConfig,
    cache: Arc<dyn ResultCache>,
    registry: Arc<QueueRegistry>,
    service: Arc<HashService>,
}

impl AppContext {
    /// Build with the in-memory LRU cache
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let cache: Arc<dyn ResultCache> = Arc::new(MemoryCache::new(config.cache_max_size));
        Self::with_cache(config, cache)
    }

    /// Build around an arbitrary cache backend
    pub fn with_cache(config: ServiceConfig, cache: Arc<dyn ResultCache>) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(QueueRegistry::new());
        let repository = Arc::new(HashRepository::new(Arc::clone(&cache), &config));
        registry.register(repository.queue_handle())?;

        let service = Arc::new(HashService::new(repository, config.max_input_length));

        info!(
            cache = cache.backend(),
            cache_max_size = config.cache_max_size,
            queue = %config.queue_name,
            concurrency = config.queue_concurrency,
            delay_ms = config.processing_delay_ms,
            "Application context ready"
        );

        Ok(Self {
            config,
            cache,
            registry,
            service,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<HashService> {
        &self.service
    }

    pub fn registry(&self) -> &Arc<QueueRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    /// Shutdown hook: drain every registered queue, then clear the cache
    ///
    /// Stop accepting new requests before calling this.
    pub async fn shutdown(&self) -> Result<()> {
        self.service.shutdown().await;
        self.registry.drain_all().await;
        self.cache.clear().await?;
        info!("Shutdown complete");
        Ok(())
    }
}
