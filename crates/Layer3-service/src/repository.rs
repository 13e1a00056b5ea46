//! Hash Repository - cache-aside glue between the result cache and the queue
//!
//! The queue processor waits the configured delay, digests the text and writes
//! the digest back into the cache before settling. Requests are coalesced on
//! the raw text.

use coalesce_foundation::{CacheStats, DigestAlgorithm, Error, Result, ResultCache, ServiceConfig};
use coalesce_task::{CoalescingQueue, QueueBuilder, QueueConfig, QueueHandle, QueueStats};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Queue payload for one computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashJob {
    pub text: String,
    /// Correlation id of the request that created the work
    pub correlation_id: String,
}

/// Result of one computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedDigest {
    pub digest: String,
    /// Wall-clock processor time, delay included
    pub processing_time_ms: u64,
}

pub struct HashRepository {
    cache: Arc<dyn ResultCache>,
    queue: CoalescingQueue<HashJob, ComputedDigest>,
}

impl HashRepository {
    pub fn new(cache: Arc<dyn ResultCache>, config: &ServiceConfig) -> Self {
        let queue_config =
            QueueConfig::new(config.queue_name.clone()).with_concurrency(config.queue_concurrency);
        let queue = QueueBuilder::new(queue_config)
            .coalesce_by(|job: &HashJob| job.text.clone())
            .build(computation(
                Arc::clone(&cache),
                config.processing_delay(),
                config.digest_algorithm,
            ));

        Self { cache, queue }
    }

    /// Cached digest for `text`, if any
    pub async fn get_cached(&self, text: &str) -> Result<Option<String>> {
        self.cache.get(text).await
    }

    /// Queue a computation, or join the one already in flight for `text`
    pub async fn enqueue_computation(
        &self,
        text: &str,
        correlation_id: &str,
    ) -> Result<ComputedDigest> {
        let job = HashJob {
            text: text.to_string(),
            correlation_id: correlation_id.to_string(),
        };
        self.queue.enqueue(job).await.map_err(Error::from)
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Wait for the queue to go idle
    pub async fn drain(&self) {
        self.queue.drain().await
    }

    /// Reject pending work and reset queue counters
    pub fn reset(&self) {
        self.queue.clear()
    }

    pub fn queue(&self) -> &CoalescingQueue<HashJob, ComputedDigest> {
        &self.queue
    }

    /// Type-erased handle for the queue registry
    pub fn queue_handle(&self) -> Arc<dyn QueueHandle> {
        Arc::new(self.queue.clone())
    }
}

/// Build the queue processor
fn computation(
    cache: Arc<dyn ResultCache>,
    delay: Duration,
    algorithm: DigestAlgorithm,
) -> impl Fn(HashJob) -> BoxFuture<'static, Result<ComputedDigest>> + Send + Sync + 'static {
    move |job: HashJob| compute(Arc::clone(&cache), delay, algorithm, job).boxed()
}

async fn compute(
    cache: Arc<dyn ResultCache>,
    delay: Duration,
    algorithm: DigestAlgorithm,
    job: HashJob,
) -> Result<ComputedDigest> {
    let started = Instant::now();
    tokio::time::sleep(delay).await;

    let digest = algorithm.digest(&job.text);
    cache.set(&job.text, digest.clone()).await?;

    let processing_time_ms = started.elapsed().as_millis() as u64;
    debug!(
        correlation_id = %job.correlation_id,
        algorithm = %algorithm,
        processing_time_ms,
        "Computed digest"
    );
    Ok(ComputedDigest {
        digest,
        processing_time_ms,
    })
}
