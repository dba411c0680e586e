// Enrichment Provider Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Short text-generation call that turns a raw unit input into a refined
/// generation instruction. A blank response is a valid (degraded) outcome,
/// not an error.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn expand(&self, raw: &str) -> Result<String>;
}

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scriptable enrichment mock.
    ///
    /// Scripted responses are consumed in order; once exhausted, the mock
    /// echoes the input with a `refined:` prefix.
    pub struct MockEnrichment {
        script: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<usize>,
    }

    impl MockEnrichment {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                calls: Mutex::new(0),
            }
        }

        pub fn push_response(&self, response: Result<String>) {
            self.script.lock().unwrap().push_back(response);
        }

        pub fn push_blank(&self) {
            self.push_response(Ok(String::new()));
        }

        pub fn push_failure(&self, err: EngineError) {
            self.push_response(Err(err));
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl Default for MockEnrichment {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl EnrichmentProvider for MockEnrichment {
        async fn expand(&self, raw: &str) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            match self.script.lock().unwrap().pop_front() {
                Some(scripted) => scripted,
                None => Ok(format!("refined: {raw}")),
            }
        }
    }
}
