//! Full engine pass over the real SQLite record store: seed units, run
//! the queue, read the persisted results back.

mod common;

use common::{build, drain};
use mediaforge_core::application::EngineConfig;
use mediaforge_core::port::clock::mocks::TestClock;
use mediaforge_infra_sqlite::{create_pool, run_migrations, SqliteRecordStore};
use std::sync::Arc;

async fn sqlite_store(db_path: &str) -> Arc<SqliteRecordStore> {
    let _ = std::fs::remove_file(db_path);
    let pool = create_pool(db_path).await.unwrap();
    run_migrations(&pool).await.unwrap();
    Arc::new(SqliteRecordStore::new(pool, Arc::new(TestClock::new(0))))
}

#[tokio::test]
async fn seeded_brief_flows_to_persisted_results() {
    let db_path = "/tmp/mediaforge_test_round_trip.db";
    let store = sqlite_store(db_path).await;
    let h = build(store, EngineConfig::for_tests());

    let job_id = "brief-1".to_string();
    h.record_store
        .insert_units(
            &job_id,
            &["a beach at dawn".to_string(), "a city at night".to_string()],
        )
        .await
        .unwrap();

    let outcome = h.manager.submit(vec![job_id.clone()]).await;
    assert_eq!(outcome.admitted, 1);
    drain(&h.manager).await;

    let results = h.record_store.fetch_results(&job_id).await.unwrap();
    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.error_message.is_none());
        assert!(!result.artifacts.is_empty());
        assert!(result.refined_instruction.starts_with("refined:"));
    }

    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn degraded_units_survive_the_sqlite_round_trip() {
    let db_path = "/tmp/mediaforge_test_degraded.db";
    let store = sqlite_store(db_path).await;
    let h = build(store, EngineConfig::for_tests());

    let job_id = "brief-2".to_string();
    h.record_store
        .insert_units(&job_id, &["good unit".to_string(), "doomed unit".to_string()])
        .await
        .unwrap();
    h.generation.push_submit_success();
    h.generation
        .push_submit_failure(mediaforge_core::error::EngineError::provider(
            "quota exhausted",
        ));

    h.manager.submit(vec![job_id.clone()]).await;
    drain(&h.manager).await;

    let results = h.record_store.fetch_results(&job_id).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].error_message.is_none());
    let message = results[1].error_message.as_deref().unwrap();
    assert!(message.to_lowercase().contains("quota"));

    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn resubmit_after_completion_replaces_previous_results() {
    let db_path = "/tmp/mediaforge_test_resubmit.db";
    let store = sqlite_store(db_path).await;
    let h = build(store, EngineConfig::for_tests());

    let job_id = "brief-3".to_string();
    h.record_store
        .insert_units(&job_id, &["one unit".to_string()])
        .await
        .unwrap();

    h.manager.submit(vec![job_id.clone()]).await;
    drain(&h.manager).await;
    h.manager.submit(vec![job_id.clone()]).await;
    drain(&h.manager).await;

    // Second run overwrote the first attempt's rows, one result per unit
    let results = h.record_store.fetch_results(&job_id).await.unwrap();
    assert_eq!(results.len(), 1);

    let _ = std::fs::remove_file(db_path);
}
