//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method. Submission
//! never blocks on processing and never reports unit-level failures
//! synchronously; callers poll status or inspect persisted results.

use crate::error::throttled;
use crate::rate_limiter::RateLimiter;
use crate::types::{StatusRequest, StatusResponse, SubmitRequest, SubmitResponse};
use jsonrpsee::types::ErrorObjectOwned;
use mediaforge_core::application::QueueManager;
use std::sync::Arc;
use tracing::info;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    queue: Arc<QueueManager>,
    rate_limiter: Arc<RateLimiter>,
}

impl RpcHandler {
    pub fn new(queue: Arc<QueueManager>) -> Self {
        // Default: 200 burst, 100 req/sec (configurable via env)
        let max_burst: u32 = std::env::var("MEDIAFORGE_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        let rate_per_sec: u32 = std::env::var("MEDIAFORGE_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            queue,
            rate_limiter: Arc::new(RateLimiter::new(max_burst, rate_per_sec)),
        }
    }

    /// media.submit.v1
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check() {
            return Err(throttled());
        }

        let requested = params.job_ids.len();
        let outcome = self.queue.submit(params.job_ids).await;

        info!(
            requested = requested,
            admitted = outcome.admitted,
            queue_len = outcome.queue_len,
            "Submit request handled"
        );

        Ok(SubmitResponse {
            admitted: outcome.admitted,
            queue_len: outcome.queue_len,
        })
    }

    /// media.status.v1
    pub async fn status(&self, _params: StatusRequest) -> Result<StatusResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check() {
            return Err(throttled());
        }

        Ok(StatusResponse {
            items: self.queue.status(),
        })
    }
}
