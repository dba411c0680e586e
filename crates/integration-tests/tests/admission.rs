//! Admission semantics: idempotent submits, unit filtering, queue length
//! reporting.

mod common;

use common::{drain, engine};
use mediaforge_core::error::EngineError;

#[tokio::test]
async fn submit_reports_admitted_count_and_queue_length() {
    let h = engine();
    h.record_store.set_units("job-a", &["a"]);
    h.record_store.set_units("job-b", &["b"]);

    let outcome = h
        .manager
        .submit(vec![
            "job-a".to_string(),
            "job-b".to_string(),
            "job-without-units".to_string(),
        ])
        .await;

    assert_eq!(outcome.admitted, 2);
    assert_eq!(outcome.queue_len, 2);
    drain(&h.manager).await;
}

#[tokio::test]
async fn resubmitting_a_live_job_id_is_ignored() {
    let h = engine();
    h.record_store.set_units("job-a", &["a"]);

    let first = h.manager.submit(vec!["job-a".to_string()]).await;
    // Second submit lands while the first item is still pending/processing
    let second = h.manager.submit(vec!["job-a".to_string()]).await;

    assert_eq!(first.admitted, 1);
    assert_eq!(second.admitted, 0);

    drain(&h.manager).await;
    assert_eq!(h.record_store.persist_calls(), 1);

    // Once the item is terminal its id is free again
    h.record_store.set_units("job-a", &["a"]);
    let third = h.manager.submit(vec!["job-a".to_string()]).await;
    assert_eq!(third.admitted, 1);
    drain(&h.manager).await;
}

#[tokio::test]
async fn a_delayed_reenqueue_still_occupies_its_job_id() {
    let h = engine();
    h.record_store.set_units("job-a", &["a"]);
    h.record_store
        .push_persist_failure(EngineError::RecordStore("network unreachable".to_string()));

    h.manager.submit(vec!["job-a".to_string()]).await;

    // Wait until the item sits in the delayed bucket
    let mut delayed_seen = false;
    for _ in 0..200_000 {
        let snapshot = h.manager.status();
        if snapshot.iter().any(|s| s.next_attempt_at.is_some()) {
            delayed_seen = true;
            break;
        }
        if snapshot.is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(delayed_seen, "expected a delayed re-enqueue");

    let outcome = h.manager.submit(vec!["job-a".to_string()]).await;
    assert_eq!(outcome.admitted, 0);

    drain(&h.manager).await;
    // Two attempts of the one tracked item, no third from the duplicate
    assert_eq!(h.record_store.persist_calls(), 2);
}

#[tokio::test]
async fn jobs_with_only_blank_units_are_skipped() {
    let h = engine();
    h.record_store.set_units("job-a", &["", "   ", "\t"]);

    let outcome = h.manager.submit(vec!["job-a".to_string()]).await;

    assert_eq!(outcome.admitted, 0);
    assert!(h.manager.status().is_empty());
    assert_eq!(h.record_store.persist_calls(), 0);
}

#[tokio::test]
async fn blank_units_are_filtered_but_the_rest_survive() {
    let h = engine();
    h.record_store.set_units("job-a", &["keep", "", "also keep"]);

    h.manager.submit(vec!["job-a".to_string()]).await;
    drain(&h.manager).await;

    let persisted = h.record_store.persisted();
    assert_eq!(persisted[0].1.len(), 2);
}

#[tokio::test]
async fn status_is_read_only() {
    let h = engine();
    h.record_store.set_units("job-a", &["a"]);
    h.manager.submit(vec!["job-a".to_string()]).await;

    // Polling status never admits, removes or mutates anything
    let before = h.manager.status().len();
    let _ = h.manager.status();
    let after = h.manager.status().len();
    assert_eq!(before, after);

    drain(&h.manager).await;
}
