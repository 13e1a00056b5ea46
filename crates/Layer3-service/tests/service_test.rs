//! End-to-end behavior of the cache-aside digest service

use async_trait::async_trait;
use coalesce_foundation::{
    sha256_hex, CacheStats, Error, ErrorCode, MemoryCache, Result, ResultCache, ServiceConfig,
};
use coalesce_service::{AppContext, HealthStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn context(concurrency: usize, delay_ms: u64) -> AppContext {
    let config = ServiceConfig::default()
        .with_concurrency(concurrency)
        .with_delay_ms(delay_ms);
    AppContext::new(config).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_hello_world_scenario() {
    let ctx = context(1, 10_000);
    let service = ctx.service();

    let first = service.process_message("hello world").await.unwrap();
    assert!(!first.from_cache);
    assert!(first.processing_time_ms >= 10_000);
    assert_eq!(first.input, "hello world");
    assert_eq!(first.digest, sha256_hex("hello world"));

    let second = service.process_message("hello world").await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.processing_time_ms, 0);
    assert_eq!(second.digest, first.digest);
    assert_ne!(second.correlation_id, first.correlation_id);
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_is_rejected_without_side_effects() {
    let ctx = context(1, 100);
    let service = ctx.service();

    let err = service.process_message("").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadRequest);
    assert!(err.code().is_client_error());

    let health = service.health();
    assert_eq!(health.cache, CacheStats::default());
    assert_eq!(health.queue.total_enqueued, 0);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_input_is_rejected() {
    let config = ServiceConfig::default()
        .with_delay_ms(10)
        .with_max_input_length(8);
    let ctx = AppContext::new(config).unwrap();

    let err = ctx.service().process_message("123456789").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PayloadTooLarge);
    assert_eq!(ctx.service().health().cache.misses, 0);

    assert!(ctx.service().process_message("12345678").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_hundred_concurrent_identical_requests_compute_once() {
    let ctx = context(10, 10_000);
    let service = ctx.service();

    let responses =
        futures::future::join_all((0..100).map(|_| service.process_message("same text"))).await;

    let expected = sha256_hex("same text");
    assert_eq!(responses.len(), 100);
    for response in &responses {
        let response = response.as_ref().unwrap();
        assert_eq!(response.digest, expected);
        assert!(!response.from_cache);
    }

    let stats = service.health().queue;
    assert_eq!(stats.total_enqueued, 1);
    assert_eq!(stats.coalesced, 99);
    assert_eq!(stats.completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_digest_is_deterministic_across_paths() {
    let ctx = context(4, 50);
    let service = ctx.service();

    let inputs = ["alpha", "beta", "gamma", "alpha", "beta", "delta"];
    let responses =
        futures::future::join_all(inputs.iter().map(|t| service.process_message(t))).await;
    for (input, response) in inputs.iter().zip(responses) {
        assert_eq!(response.unwrap().digest, sha256_hex(input));
    }

    for input in inputs {
        let response = service.process_message(input).await.unwrap();
        assert!(response.from_cache);
        assert_eq!(response.digest, sha256_hex(input));
    }
}

#[tokio::test(start_paused = true)]
async fn test_evicted_entry_is_recomputed() {
    let config = ServiceConfig::default()
        .with_delay_ms(10)
        .with_cache_max_size(2);
    let ctx = AppContext::new(config).unwrap();
    let service = ctx.service();

    for text in ["a", "b", "c"] {
        service.process_message(text).await.unwrap();
    }
    assert_eq!(service.health().cache.size, 2);

    // "a" was least recently used
    assert!(!service.process_message("a").await.unwrap().from_cache);
    assert!(service.process_message("c").await.unwrap().from_cache);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_then_clears_cache() {
    let ctx = Arc::new(context(2, 1_000));

    let mut handles = Vec::new();
    for n in 0..5 {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            ctx.service().process_message(&format!("job-{}", n)).await
        }));
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(ctx.service().health().queue.processing, 2);

    ctx.shutdown().await.unwrap();

    let health = ctx.service().health();
    assert_eq!(health.status, HealthStatus::Draining);
    assert_eq!(health.queue.pending, 0);
    assert_eq!(health.queue.processing, 0);
    assert_eq!(health.queue.completed, 5);
    assert_eq!(health.cache.size, 0);

    for handle in handles {
        assert!(!handle.await.unwrap().unwrap().from_cache);
    }
}

#[tokio::test(start_paused = true)]
async fn test_reset_rejects_pending_with_cleared_code() {
    let ctx = Arc::new(context(1, 1_000));

    let first = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.service().process_message("first").await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;
    let second = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.service().process_message("second").await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;

    ctx.service().reset();

    let err = second.await.unwrap().unwrap_err();
    assert_eq!(err.code(), ErrorCode::QueueCleared);
    assert!(first.await.unwrap().is_ok());
    assert_eq!(ctx.service().health().queue.total_enqueued, 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ServiceConfig::default().with_concurrency(0);
    assert!(matches!(AppContext::new(config), Err(Error::Config(_))));
}

/// Cache whose backend can be switched off
struct FlakyCache {
    inner: MemoryCache,
    reads_fail: AtomicBool,
    writes_fail: AtomicBool,
}

impl FlakyCache {
    fn new() -> Self {
        Self {
            inner: MemoryCache::new(16),
            reads_fail: AtomicBool::new(false),
            writes_fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ResultCache for FlakyCache {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.reads_fail.load(Ordering::SeqCst) {
            return Err(Error::Backend("connection refused".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(Error::Backend("write timed out".into()));
        }
        self.inner.set(key, value).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }

    fn stats(&self) -> CacheStats {
        // Remote backends may not know their size
        CacheStats {
            size: 0,
            ..self.inner.stats()
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_backend_read_failure_surfaces_directly() {
    let cache = Arc::new(FlakyCache::new());
    cache.reads_fail.store(true, Ordering::SeqCst);
    let ctx = AppContext::with_cache(ServiceConfig::default().with_delay_ms(10), cache).unwrap();

    let err = ctx.service().process_message("x").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BackendUnavailable);
    assert!(err.is_retryable());
    assert_eq!(ctx.service().health().queue.total_enqueued, 0);
}

#[tokio::test(start_paused = true)]
async fn test_processing_failure_reaches_every_coalesced_caller() {
    let cache = Arc::new(FlakyCache::new());
    cache.writes_fail.store(true, Ordering::SeqCst);
    let ctx = AppContext::with_cache(
        ServiceConfig::default().with_delay_ms(10),
        Arc::clone(&cache) as Arc<dyn ResultCache>,
    )
    .unwrap();
    let service = ctx.service();

    let results = futures::future::join_all((0..3).map(|_| service.process_message("x"))).await;
    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProcessingFailed);
        assert!(err.to_string().contains("write timed out"));
    }

    let stats = service.health().queue;
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.coalesced, 2);

    // Scheduling continues once the backend recovers
    cache.writes_fail.store(false, Ordering::SeqCst);
    assert!(service.process_message("x").await.is_ok());
    assert_eq!(service.health().cache.size, 0);
}
