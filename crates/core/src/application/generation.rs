// Generation Client - drives one unit through enrich -> submit -> poll -> store

use crate::application::constants::EngineConfig;
use crate::application::retry::retry_with_backoff;
use crate::error::{EngineError, Result};
use crate::port::{ArtifactStore, EnrichmentProvider, GenerationProvider, JobHandle, PollStatus, Sleeper};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What one unit yields when generation did not fail outright
#[derive(Debug, Clone)]
pub struct UnitOutcome {
    /// Empty when enrichment produced nothing usable (degraded success)
    pub refined_instruction: String,
    /// Public refs of stored artifacts
    pub artifacts: Vec<String>,
}

/// Client over the two remote generation calls plus artifact persistence.
///
/// Submit and poll are individually wrapped in the bounded retry helper so
/// transient provider errors fail fast here instead of restarting the
/// whole item.
pub struct GenerationClient {
    enrichment: Arc<dyn EnrichmentProvider>,
    generation: Arc<dyn GenerationProvider>,
    artifacts: Arc<dyn ArtifactStore>,
    sleeper: Arc<dyn Sleeper>,
    config: EngineConfig,
}

impl GenerationClient {
    pub fn new(
        enrichment: Arc<dyn EnrichmentProvider>,
        generation: Arc<dyn GenerationProvider>,
        artifacts: Arc<dyn ArtifactStore>,
        sleeper: Arc<dyn Sleeper>,
        config: EngineConfig,
    ) -> Self {
        Self {
            enrichment,
            generation,
            artifacts,
            sleeper,
            config,
        }
    }

    /// Generate artifacts for one unit input.
    ///
    /// Fails with the raw error of whichever step broke; the caller
    /// classifies and records it. A blank enrichment is not an error.
    pub async fn generate(&self, raw: &str) -> Result<UnitOutcome> {
        let refined = self.enrichment.expand(raw).await?;
        let refined = refined.trim().to_string();

        if refined.is_empty() {
            debug!("Enrichment yielded nothing usable, skipping generation for unit");
            return Ok(UnitOutcome {
                refined_instruction: String::new(),
                artifacts: Vec::new(),
            });
        }

        let handle = retry_with_backoff(
            self.sleeper.as_ref(),
            self.config.call_retry_attempts,
            self.config.call_retry_base_delay_ms,
            || self.generation.submit(&refined),
        )
        .await?;

        info!(handle = %handle, "Generation job submitted");

        let status = self.await_terminal(&handle).await?;
        let stored = self.store_artifacts(&handle, &status.artifact_uris).await;

        info!(
            handle = %handle,
            produced = status.artifact_uris.len(),
            stored = stored.len(),
            "Generation job finished"
        );

        Ok(UnitOutcome {
            refined_instruction: refined,
            artifacts: stored,
        })
    }

    /// Poll until the job is terminal, bounded by the poll budget.
    ///
    /// Each poll call carries its own retry budget so a transient polling
    /// error is not mistaken for job failure.
    async fn await_terminal(&self, handle: &JobHandle) -> Result<PollStatus> {
        for poll in 0..self.config.max_poll_attempts {
            let status = retry_with_backoff(
                self.sleeper.as_ref(),
                self.config.call_retry_attempts,
                self.config.call_retry_base_delay_ms,
                || self.generation.poll(handle),
            )
            .await?;

            if status.done {
                return Ok(status);
            }

            debug!(handle = %handle, poll = poll, "Generation job still running");
            self.sleeper.sleep(self.config.poll_interval).await;
        }

        Err(EngineError::provider(format!(
            "generation job {} timed out after {} polls",
            handle, self.config.max_poll_attempts
        )))
    }

    /// Download and persist each artifact; one artifact's failure is
    /// logged and skipped, it never fails the unit.
    async fn store_artifacts(&self, handle: &JobHandle, uris: &[String]) -> Vec<String> {
        let mut refs = Vec::with_capacity(uris.len());
        for (index, uri) in uris.iter().enumerate() {
            let path = artifact_path(handle, index, uri);
            match self.transfer(uri, &path).await {
                Ok(public_ref) => refs.push(public_ref),
                Err(err) => warn!(
                    handle = %handle,
                    uri = %uri,
                    error = %err,
                    "Skipping artifact that failed to transfer"
                ),
            }
        }
        refs
    }

    async fn transfer(&self, uri: &str, path: &str) -> Result<String> {
        let bytes = self.generation.fetch_artifact(uri).await?;
        self.artifacts.store(bytes, path).await
    }
}

/// Storage path for one artifact, keeping the source extension when the
/// URI has a recognizable one
fn artifact_path(handle: &JobHandle, index: usize, uri: &str) -> String {
    match std::path::Path::new(uri).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.len() <= 4 => format!("renders/{handle}/{index}.{ext}"),
        _ => format!("renders/{handle}/{index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::artifact_store::mocks::MockArtifactStore;
    use crate::port::clock::mocks::TestClock;
    use crate::port::enrichment::mocks::MockEnrichment;
    use crate::port::generation::mocks::MockGeneration;

    struct Harness {
        enrichment: Arc<MockEnrichment>,
        generation: Arc<MockGeneration>,
        artifacts: Arc<MockArtifactStore>,
        clock: Arc<TestClock>,
        client: GenerationClient,
    }

    fn harness() -> Harness {
        let enrichment = Arc::new(MockEnrichment::new());
        let generation = Arc::new(MockGeneration::new());
        let artifacts = Arc::new(MockArtifactStore::new());
        let clock = Arc::new(TestClock::new(0));
        let client = GenerationClient::new(
            enrichment.clone(),
            generation.clone(),
            artifacts.clone(),
            clock.clone(),
            EngineConfig::for_tests(),
        );
        Harness {
            enrichment,
            generation,
            artifacts,
            clock,
            client,
        }
    }

    #[tokio::test]
    async fn test_full_generation_stores_artifacts() {
        let h = harness();
        h.generation.set_artifact_uris(&["mock://out/a.mp4", "mock://out/b.mp4"]);

        let outcome = h.client.generate("a beach at dawn").await.unwrap();

        assert_eq!(outcome.refined_instruction, "refined: a beach at dawn");
        assert_eq!(outcome.artifacts.len(), 2);
        assert!(outcome.artifacts[0].contains("renders/render-1/0.mp4"));
        assert_eq!(h.artifacts.stored().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_enrichment_is_degraded_success() {
        let h = harness();
        h.enrichment.push_blank();

        let outcome = h.client.generate("whatever").await.unwrap();

        assert!(outcome.refined_instruction.is_empty());
        assert!(outcome.artifacts.is_empty());
        assert_eq!(h.generation.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_retries_absorb_transient_rate_limit() {
        let h = harness();
        h.generation.push_submit_failure(EngineError::Provider {
            status: Some(429),
            message: "too many requests".to_string(),
        });
        h.generation.push_submit_failure(EngineError::Provider {
            status: Some(429),
            message: "too many requests".to_string(),
        });

        let outcome = h.client.generate("unit two").await.unwrap();

        assert_eq!(h.generation.submit_calls(), 3);
        assert!(!outcome.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_quota_submit_failure_surfaces_raw_error() {
        let h = harness();
        h.generation.push_submit_failure(EngineError::provider("quota exhausted"));

        let err = h.client.generate("unit").await.unwrap_err();

        assert!(err.to_string().to_lowercase().contains("quota"));
        // Non-retryable: only one submit attempt was made
        assert_eq!(h.generation.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_polling_waits_between_checks() {
        let h = harness();
        h.generation.set_polls_before_done(3);

        h.client.generate("unit").await.unwrap();

        assert_eq!(h.generation.poll_calls(), 4);
        // Three waits of poll_interval between the four polls
        let polls = h
            .clock
            .recorded_sleeps()
            .iter()
            .filter(|d| **d == EngineConfig::for_tests().poll_interval)
            .count();
        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn test_poll_budget_exhaustion_is_timeout_error() {
        let h = harness();
        h.generation.set_polls_before_done(u32::MAX);

        let err = h.client.generate("unit").await.unwrap_err();

        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_failed_artifact_download_is_skipped() {
        let h = harness();
        h.generation.set_artifact_uris(&["mock://out/0.png", "mock://out/1.png"]);
        h.generation.push_fetch_failure(EngineError::provider("network error"));

        let outcome = h.client.generate("unit").await.unwrap();

        // First fetch failed and was skipped, second went through
        assert_eq!(outcome.artifacts.len(), 1);
        assert!(!outcome.refined_instruction.is_empty());
    }
}
