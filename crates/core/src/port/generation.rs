// Generation Provider Port (Interface)
//
// Long-running render backend: a submitted instruction becomes a provider
// job that is polled until terminal, after which its outputs are fetched.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider-side handle for a submitted generation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One poll observation of a provider job
#[derive(Debug, Clone)]
pub struct PollStatus {
    pub done: bool,
    /// Provider-scoped URIs of produced artifacts; only meaningful once done
    pub artifact_uris: Vec<String>,
}

impl PollStatus {
    pub fn running() -> Self {
        Self {
            done: false,
            artifact_uris: Vec::new(),
        }
    }

    pub fn finished(artifact_uris: Vec<String>) -> Self {
        Self {
            done: true,
            artifact_uris,
        }
    }
}

/// Generation provider interface
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit an instruction; returns the provider's job handle
    async fn submit(&self, instruction: &str) -> Result<JobHandle>;

    /// Check whether a submitted job reached a terminal state
    async fn poll(&self, handle: &JobHandle) -> Result<PollStatus>;

    /// Download one produced artifact by its provider URI
    async fn fetch_artifact(&self, uri: &str) -> Result<Vec<u8>>;
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scriptable generation mock.
    ///
    /// Each call pops the next scripted outcome for its operation (`None`
    /// entries mean success); calls with an empty script succeed. So
    /// "first submit succeeds, the next two fail" is
    /// `push_submit_success(); push_submit_failure(..); push_submit_failure(..)`.
    /// `set_polls_before_done` makes the job look in-flight for that many
    /// successful polls.
    pub struct MockGeneration {
        submit_script: Mutex<VecDeque<Option<EngineError>>>,
        poll_failures: Mutex<VecDeque<EngineError>>,
        fetch_failures: Mutex<VecDeque<EngineError>>,
        polls_before_done: Mutex<u32>,
        remaining_polls: Mutex<u32>,
        artifact_uris: Mutex<Vec<String>>,
        submit_calls: Mutex<usize>,
        poll_calls: Mutex<usize>,
        fetch_calls: Mutex<usize>,
        submit_seq: Mutex<u64>,
    }

    impl MockGeneration {
        pub fn new() -> Self {
            Self {
                submit_script: Mutex::new(VecDeque::new()),
                poll_failures: Mutex::new(VecDeque::new()),
                fetch_failures: Mutex::new(VecDeque::new()),
                polls_before_done: Mutex::new(0),
                remaining_polls: Mutex::new(0),
                artifact_uris: Mutex::new(vec!["mock://artifact/0".to_string()]),
                submit_calls: Mutex::new(0),
                poll_calls: Mutex::new(0),
                fetch_calls: Mutex::new(0),
                submit_seq: Mutex::new(0),
            }
        }

        pub fn push_submit_failure(&self, err: EngineError) {
            self.submit_script.lock().unwrap().push_back(Some(err));
        }

        pub fn push_submit_success(&self) {
            self.submit_script.lock().unwrap().push_back(None);
        }

        pub fn push_poll_failure(&self, err: EngineError) {
            self.poll_failures.lock().unwrap().push_back(err);
        }

        pub fn push_fetch_failure(&self, err: EngineError) {
            self.fetch_failures.lock().unwrap().push_back(err);
        }

        pub fn set_polls_before_done(&self, polls: u32) {
            *self.polls_before_done.lock().unwrap() = polls;
        }

        pub fn set_artifact_uris(&self, uris: &[&str]) {
            *self.artifact_uris.lock().unwrap() =
                uris.iter().map(|u| u.to_string()).collect();
        }

        pub fn submit_calls(&self) -> usize {
            *self.submit_calls.lock().unwrap()
        }

        pub fn poll_calls(&self) -> usize {
            *self.poll_calls.lock().unwrap()
        }

        pub fn fetch_calls(&self) -> usize {
            *self.fetch_calls.lock().unwrap()
        }
    }

    impl Default for MockGeneration {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl GenerationProvider for MockGeneration {
        async fn submit(&self, _instruction: &str) -> Result<JobHandle> {
            *self.submit_calls.lock().unwrap() += 1;
            if let Some(Some(err)) = self.submit_script.lock().unwrap().pop_front() {
                return Err(err);
            }
            *self.remaining_polls.lock().unwrap() = *self.polls_before_done.lock().unwrap();
            let mut seq = self.submit_seq.lock().unwrap();
            *seq += 1;
            Ok(JobHandle::new(format!("render-{seq}")))
        }

        async fn poll(&self, _handle: &JobHandle) -> Result<PollStatus> {
            *self.poll_calls.lock().unwrap() += 1;
            if let Some(err) = self.poll_failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            let mut remaining = self.remaining_polls.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(PollStatus::running());
            }
            Ok(PollStatus::finished(self.artifact_uris.lock().unwrap().clone()))
        }

        async fn fetch_artifact(&self, uri: &str) -> Result<Vec<u8>> {
            *self.fetch_calls.lock().unwrap() += 1;
            if let Some(err) = self.fetch_failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            Ok(uri.as_bytes().to_vec())
        }
    }
}
