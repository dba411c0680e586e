// Job Processor - drives one queue item through all its units

use crate::application::backoff::BackoffPolicy;
use crate::application::classify::classify;
use crate::application::constants::EngineConfig;
use crate::application::generation::GenerationClient;
use crate::domain::{QueueItem, UnitResult};
use crate::error::EngineError;
use crate::port::{Clock, RecordStore, Sleeper};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// What the queue should do with the item after this attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessVerdict {
    /// Terminal: results persisted, remove from the queue
    Completed,
    /// Back to Pending; re-enqueue at the tail once `delay` elapses
    Requeue { delay: Duration },
    /// Terminal: retry budget gone or failure not retryable
    Failed,
}

/// Processes one item at a time: ordered unit loop with pacing delays,
/// unit failures isolated into degraded results, one persist at the end.
pub struct JobProcessor {
    record_store: Arc<dyn RecordStore>,
    client: GenerationClient,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    unit_delay: Duration,
    backoff: BackoffPolicy,
}

impl JobProcessor {
    pub fn new(
        record_store: Arc<dyn RecordStore>,
        client: GenerationClient,
        sleeper: Arc<dyn Sleeper>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            record_store,
            client,
            sleeper,
            clock,
            unit_delay: config.unit_delay,
            backoff: BackoffPolicy::new(config.item_retry_base_delay_ms, config.max_item_retries),
        }
    }

    /// Process one attempt of `item`. Never errors: every failure becomes
    /// a state transition on the item plus a verdict for the queue.
    pub async fn process(&self, item: &mut QueueItem) -> ProcessVerdict {
        info!(
            job_id = %item.job_id,
            units = item.units.len(),
            retry_count = item.retry_count,
            "Processing queue item"
        );

        let results = self.run_units(item).await;
        debug_assert_eq!(results.len(), item.units.len());

        let failed_units = results.iter().filter(|r| r.is_failed()).count();

        // One flush per attempt; a crash mid-item loses only in-flight state
        match self.record_store.persist_results(&item.job_id, &results).await {
            Ok(()) => {
                if let Err(e) = item.complete() {
                    error!(job_id = %item.job_id, error = %e, "Item in unexpected state after processing");
                    item.fail();
                    return ProcessVerdict::Failed;
                }
                info!(
                    job_id = %item.job_id,
                    units = results.len(),
                    failed_units = failed_units,
                    "Queue item completed"
                );
                ProcessVerdict::Completed
            }
            Err(err) => self.item_failure(item, err),
        }
    }

    /// Run every unit in order. A single unit's failure never aborts the
    /// remaining units; each input yields exactly one result.
    async fn run_units(&self, item: &QueueItem) -> Vec<UnitResult> {
        let mut results = Vec::with_capacity(item.units.len());
        let mut calls_made = 0usize;

        for unit in &item.units {
            // Blank inputs get an empty result without spending a request
            if unit.is_blank() {
                results.push(UnitResult::degraded(unit.clone()));
                continue;
            }

            if calls_made > 0 {
                self.sleeper.sleep(self.unit_delay).await;
            }
            calls_made += 1;

            match self.client.generate(unit.as_str()).await {
                Ok(outcome) if outcome.refined_instruction.is_empty() => {
                    results.push(UnitResult::degraded(unit.clone()));
                }
                Ok(outcome) => {
                    results.push(UnitResult::generated(
                        unit.clone(),
                        outcome.refined_instruction,
                        outcome.artifacts,
                    ));
                }
                Err(err) => {
                    let classified = classify(&err);
                    warn!(
                        job_id = %item.job_id,
                        category = %classified.category,
                        error = %err,
                        "Unit generation failed, continuing with remaining units"
                    );
                    results.push(UnitResult::failed(unit.clone(), err.to_string()));
                }
            }
        }

        results
    }

    /// Item-level failure: the whole attempt restarts from the first unit
    /// on retry, partial results are dropped with the attempt.
    fn item_failure(&self, item: &mut QueueItem, err: EngineError) -> ProcessVerdict {
        let classified = classify(&err);

        if classified.retryable && item.retry_count < self.backoff.max_retries {
            let delay = self.backoff.next_delay(item.retry_count, &classified);
            item.requeue(self.clock.now_millis());
            warn!(
                job_id = %item.job_id,
                retry_count = item.retry_count,
                max_retries = self.backoff.max_retries,
                delay_ms = delay.as_millis() as u64,
                category = %classified.category,
                error = %err,
                "Item attempt failed, scheduling re-enqueue"
            );
            ProcessVerdict::Requeue { delay }
        } else {
            item.fail();
            error!(
                job_id = %item.job_id,
                retry_count = item.retry_count,
                category = %classified.category,
                error = %err,
                "Item failed permanently"
            );
            ProcessVerdict::Failed
        }
    }
}
