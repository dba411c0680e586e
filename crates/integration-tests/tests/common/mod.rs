//! Shared harness for engine integration tests

use mediaforge_core::application::{EngineConfig, GenerationClient, JobProcessor, QueueManager};
use mediaforge_core::port::artifact_store::mocks::MockArtifactStore;
use mediaforge_core::port::clock::mocks::TestClock;
use mediaforge_core::port::enrichment::mocks::MockEnrichment;
use mediaforge_core::port::generation::mocks::MockGeneration;
use mediaforge_core::port::record_store::mocks::MockRecordStore;
use mediaforge_core::port::RecordStore;
use std::sync::Arc;

pub struct EngineHarness<S> {
    pub record_store: Arc<S>,
    pub enrichment: Arc<MockEnrichment>,
    pub generation: Arc<MockGeneration>,
    pub artifacts: Arc<MockArtifactStore>,
    pub clock: Arc<TestClock>,
    pub manager: Arc<QueueManager>,
}

/// Wire the whole engine over in-memory mocks and a virtual clock
pub fn engine() -> EngineHarness<MockRecordStore> {
    build(Arc::new(MockRecordStore::new()), EngineConfig::for_tests())
}

/// Same wiring over an arbitrary record store implementation
pub fn build<S: RecordStore + 'static>(
    record_store: Arc<S>,
    config: EngineConfig,
) -> EngineHarness<S> {
    let enrichment = Arc::new(MockEnrichment::new());
    let generation = Arc::new(MockGeneration::new());
    let artifacts = Arc::new(MockArtifactStore::new());
    let clock = Arc::new(TestClock::new(1_000_000));

    let store: Arc<dyn RecordStore> = record_store.clone();
    let client = GenerationClient::new(
        enrichment.clone(),
        generation.clone(),
        artifacts.clone(),
        clock.clone(),
        config.clone(),
    );
    let processor = Arc::new(JobProcessor::new(
        store.clone(),
        client,
        clock.clone(),
        clock.clone(),
        &config,
    ));
    let manager = QueueManager::new(processor, store, clock.clone(), clock.clone());

    EngineHarness {
        record_store,
        enrichment,
        generation,
        artifacts,
        clock,
        manager,
    }
}

/// Yield until every tracked item reached a terminal state and left the
/// queue. Timing runs on the virtual clock, so this never waits on the
/// wall clock.
pub async fn drain(manager: &Arc<QueueManager>) {
    for _ in 0..200_000 {
        if manager.status().is_empty() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("queue did not drain");
}
