// Artifact Store Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Durable storage for completed generation outputs.
///
/// `store` writes the bytes under the given path and returns a retrievable
/// public reference.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, path: &str) -> Result<String>;
}

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-memory artifact store recording every write
    pub struct MockArtifactStore {
        stored: Mutex<Vec<(String, usize)>>,
        failures: Mutex<VecDeque<EngineError>>,
    }

    impl MockArtifactStore {
        pub fn new() -> Self {
            Self {
                stored: Mutex::new(Vec::new()),
                failures: Mutex::new(VecDeque::new()),
            }
        }

        pub fn push_failure(&self, err: EngineError) {
            self.failures.lock().unwrap().push_back(err);
        }

        /// (path, byte length) of every successful store, in order
        pub fn stored(&self) -> Vec<(String, usize)> {
            self.stored.lock().unwrap().clone()
        }
    }

    impl Default for MockArtifactStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ArtifactStore for MockArtifactStore {
        async fn store(&self, bytes: Vec<u8>, path: &str) -> Result<String> {
            if let Some(err) = self.failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            self.stored
                .lock()
                .unwrap()
                .push((path.to_string(), bytes.len()));
            Ok(format!("https://cdn.invalid/{path}"))
        }
    }
}
