//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use mediaforge_core::application::ItemSnapshot;
use serde::{Deserialize, Serialize};

/// media.submit.v1 - Submit a batch of jobs for generation
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub job_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    /// Jobs actually admitted (duplicates and unit-less jobs are skipped)
    pub admitted: usize,
    /// Total tracked items after admission, delayed re-enqueues included
    pub queue_len: usize,
}

/// media.status.v1 - Snapshot of the generation queue
#[derive(Debug, Deserialize, Default)]
pub struct StatusRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub items: Vec<ItemSnapshot>,
}
