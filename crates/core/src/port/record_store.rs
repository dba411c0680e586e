// Record Store Port (Interface)
//
// The document/record backend the wider platform writes briefs into.
// The queue reads a job's units from it and writes the full result set
// back at the end of each processing attempt.

use crate::domain::{JobId, UnitInput, UnitResult};
use crate::error::Result;
use async_trait::async_trait;

/// Record store interface for job inputs and results
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the ordered unit inputs for a job (empty if the job has none)
    async fn fetch_units(&self, job_id: &JobId) -> Result<Vec<UnitInput>>;

    /// Persist the complete result set for a job, replacing any previous attempt
    async fn persist_results(&self, job_id: &JobId, results: &[UnitResult]) -> Result<()>;
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// In-memory record store with scriptable persist failures
    pub struct MockRecordStore {
        units: Mutex<HashMap<JobId, Vec<UnitInput>>>,
        persisted: Mutex<Vec<(JobId, Vec<UnitResult>)>>,
        persist_failures: Mutex<VecDeque<EngineError>>,
        persist_calls: Mutex<usize>,
    }

    impl MockRecordStore {
        pub fn new() -> Self {
            Self {
                units: Mutex::new(HashMap::new()),
                persisted: Mutex::new(Vec::new()),
                persist_failures: Mutex::new(VecDeque::new()),
                persist_calls: Mutex::new(0),
            }
        }

        pub fn set_units(&self, job_id: impl Into<JobId>, descriptions: &[&str]) {
            self.units.lock().unwrap().insert(
                job_id.into(),
                descriptions.iter().map(|d| UnitInput::new(*d)).collect(),
            );
        }

        /// Queue an error for the next `persist_results` call; once the
        /// queue drains, persists succeed again.
        pub fn push_persist_failure(&self, err: EngineError) {
            self.persist_failures.lock().unwrap().push_back(err);
        }

        pub fn persisted(&self) -> Vec<(JobId, Vec<UnitResult>)> {
            self.persisted.lock().unwrap().clone()
        }

        pub fn persist_calls(&self) -> usize {
            *self.persist_calls.lock().unwrap()
        }
    }

    impl Default for MockRecordStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl RecordStore for MockRecordStore {
        async fn fetch_units(&self, job_id: &JobId) -> Result<Vec<UnitInput>> {
            Ok(self
                .units
                .lock()
                .unwrap()
                .get(job_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn persist_results(&self, job_id: &JobId, results: &[UnitResult]) -> Result<()> {
            *self.persist_calls.lock().unwrap() += 1;
            if let Some(err) = self.persist_failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            self.persisted
                .lock()
                .unwrap()
                .push((job_id.clone(), results.to_vec()));
            Ok(())
        }
    }
}
