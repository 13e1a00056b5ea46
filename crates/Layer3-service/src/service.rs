//! Hash Service - request entry point
//!
//! Assigns a correlation id per request, serves cache hits immediately and
//! sends misses through the repository's queue.

use crate::repository::HashRepository;
use crate::types::{HealthReport, HealthStatus, ProcessResponse};
use crate::validation::validate_input;
use coalesce_foundation::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct HashService {
    repository: Arc<HashRepository>,
    max_input_length: usize,
    started_at: Instant,
    draining: AtomicBool,
}

impl HashService {
    pub fn new(repository: Arc<HashRepository>, max_input_length: usize) -> Self {
        Self {
            repository,
            max_input_length,
            started_at: Instant::now(),
            draining: AtomicBool::new(false),
        }
    }

    /// Validate, then answer from cache or compute
    pub async fn process_message(&self, text: &str) -> Result<ProcessResponse> {
        validate_input(text, self.max_input_length)?;

        let correlation_id = Uuid::new_v4().to_string();

        if let Some(digest) = self.repository.get_cached(text).await? {
            debug!(correlation_id = %correlation_id, "Served from cache");
            return Ok(ProcessResponse {
                correlation_id,
                input: text.to_string(),
                digest,
                processing_time_ms: 0,
                from_cache: true,
            });
        }

        debug!(correlation_id = %correlation_id, "Cache miss, queueing computation");
        let computed = match self
            .repository
            .enqueue_computation(text, &correlation_id)
            .await
        {
            Ok(computed) => computed,
            Err(e) => {
                warn!(correlation_id = %correlation_id, error = %e, "Computation failed");
                return Err(e);
            }
        };

        Ok(ProcessResponse {
            correlation_id,
            input: text.to_string(),
            digest: computed.digest,
            processing_time_ms: computed.processing_time_ms,
            from_cache: false,
        })
    }

    /// Combined cache and queue statistics
    pub fn health(&self) -> HealthReport {
        let status = if self.is_draining() {
            HealthStatus::Draining
        } else {
            HealthStatus::Ok
        };
        HealthReport {
            status,
            uptime_ms: self.started_at.elapsed().as_millis() as u64,
            cache: self.repository.cache_stats(),
            queue: self.repository.queue_stats(),
        }
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Drain the computation queue; must finish before the process exits
    pub async fn shutdown(&self) {
        self.draining.store(true, Ordering::SeqCst);
        info!("Service shutting down, draining queue");
        self.repository.drain().await;
        info!("Service drained");
    }

    /// Clear queue state (rejects pending work, resets counters)
    pub fn reset(&self) {
        info!("Resetting queue state");
        self.repository.reset();
    }

    pub fn repository(&self) -> &Arc<HashRepository> {
        &self.repository
    }
}
