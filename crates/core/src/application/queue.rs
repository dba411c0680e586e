// Queue Manager - owns the in-memory queue and the single worker loop

use crate::application::constants::IDLE_SLEEP_DURATION;
use crate::application::processor::{JobProcessor, ProcessVerdict};
use crate::domain::{ItemState, JobId, QueueItem};
use crate::port::{Clock, RecordStore, Sleeper};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Result of one submit call
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub admitted: usize,
    pub queue_len: usize,
}

/// Read-only view of one tracked item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub job_id: JobId,
    pub state: ItemState,
    pub unit_count: usize,
    pub retry_count: u32,
    pub enqueued_at: i64,
    /// When a re-enqueued item becomes runnable again (epoch ms)
    pub next_attempt_at: Option<i64>,
}

impl ItemSnapshot {
    fn from_item(item: &QueueItem, next_attempt_at: Option<i64>) -> Self {
        Self {
            job_id: item.job_id.clone(),
            state: item.state,
            unit_count: item.units.len(),
            retry_count: item.retry_count,
            enqueued_at: item.enqueued_at,
            next_attempt_at,
        }
    }
}

/// An item waiting out its backoff before rejoining the queue tail
struct DelayedItem {
    ready_at: i64,
    item: QueueItem,
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<QueueItem>,
    delayed: Vec<DelayedItem>,
    is_processing: bool,
}

enum Step {
    Run(QueueItem),
    Wait,
    Exit,
}

/// Owns all mutable queue state behind one mutex; the lock is never held
/// across an await. Admission is synchronous and non-blocking; exactly one
/// worker loop runs at a time, guarded by `is_processing`.
pub struct QueueManager {
    state: Mutex<QueueState>,
    processor: Arc<JobProcessor>,
    record_store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl QueueManager {
    pub fn new(
        processor: Arc<JobProcessor>,
        record_store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(QueueState::default()),
            processor,
            record_store,
            clock,
            sleeper,
        })
    }

    /// Admit a batch of jobs.
    ///
    /// Ids already tracked as PENDING or PROCESSING (including delayed
    /// re-enqueues) are skipped, not merged; ids with no usable units are
    /// skipped. Never waits on processing.
    pub async fn submit(self: &Arc<Self>, job_ids: Vec<JobId>) -> SubmitOutcome {
        let mut admitted = 0usize;

        for job_id in job_ids {
            if self.is_tracked(&job_id) {
                debug!(job_id = %job_id, "Skipping duplicate submission: item already in flight");
                continue;
            }

            let units = match self.record_store.fetch_units(&job_id).await {
                Ok(units) => units,
                Err(err) => {
                    warn!(job_id = %job_id, error = %err, "Could not fetch units, skipping job");
                    continue;
                }
            };
            let units: Vec<_> = units.into_iter().filter(|u| !u.is_blank()).collect();
            if units.is_empty() {
                debug!(job_id = %job_id, "Skipping job with no usable units");
                continue;
            }

            {
                let mut st = self.lock_state();
                // Re-check under the lock: a concurrent submit may have won
                // the slot while units were being fetched
                if Self::tracked_in(&st, &job_id) {
                    continue;
                }
                let item = QueueItem::new(job_id.clone(), units, self.clock.now_millis());
                st.items.push_back(item);
            }
            admitted += 1;
            info!(job_id = %job_id, "Job admitted to generation queue");
        }

        let queue_len = {
            let st = self.lock_state();
            st.items.len() + st.delayed.len()
        };

        if admitted > 0 {
            self.ensure_worker();
        }

        SubmitOutcome {
            admitted,
            queue_len,
        }
    }

    /// Read-only snapshot of every tracked item, delayed re-enqueues
    /// included. No side effects.
    pub fn status(&self) -> Vec<ItemSnapshot> {
        let st = self.lock_state();
        let mut snapshot: Vec<ItemSnapshot> = st
            .items
            .iter()
            .map(|item| ItemSnapshot::from_item(item, None))
            .collect();
        snapshot.extend(
            st.delayed
                .iter()
                .map(|d| ItemSnapshot::from_item(&d.item, Some(d.ready_at))),
        );
        snapshot
    }

    fn is_tracked(&self, job_id: &JobId) -> bool {
        Self::tracked_in(&self.lock_state(), job_id)
    }

    fn tracked_in(st: &QueueState, job_id: &JobId) -> bool {
        st.items
            .iter()
            .any(|item| item.job_id == *job_id && item.is_live())
            || st.delayed.iter().any(|d| d.item.job_id == *job_id)
    }

    /// Start the worker loop unless one is already running
    fn ensure_worker(self: &Arc<Self>) {
        {
            let mut st = self.lock_state();
            if st.is_processing {
                return;
            }
            let has_work = st.items.iter().any(|i| i.state == ItemState::Pending)
                || !st.delayed.is_empty();
            if !has_work {
                return;
            }
            st.is_processing = true;
        }
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run_worker().await;
        });
    }

    async fn run_worker(self: Arc<Self>) {
        info!("Queue worker started");
        loop {
            match self.next_step() {
                Step::Exit => break,
                Step::Wait => self.sleeper.sleep(IDLE_SLEEP_DURATION).await,
                Step::Run(item) => self.run_item(item).await,
            }
        }
        info!("Queue worker stopped: queue drained");
    }

    /// Promote due re-enqueues, then pick the first pending item (FIFO by
    /// queue position, so re-enqueued items go to the back of the line).
    /// The exit decision clears `is_processing` under the same lock that
    /// checked for work, closing the race with `submit`.
    fn next_step(&self) -> Step {
        let mut st = self.lock_state();
        let now = self.clock.now_millis();

        let mut i = 0;
        while i < st.delayed.len() {
            if st.delayed[i].ready_at <= now {
                let entry = st.delayed.remove(i);
                debug!(job_id = %entry.item.job_id, "Re-enqueueing item after backoff");
                st.items.push_back(entry.item);
            } else {
                i += 1;
            }
        }

        if let Some(pos) = st.items.iter().position(|it| it.state == ItemState::Pending) {
            match st.items[pos].begin_processing() {
                Ok(()) => return Step::Run(st.items[pos].clone()),
                Err(e) => {
                    // Cannot happen for an item we just saw as PENDING
                    error!(job_id = %st.items[pos].job_id, error = %e, "Skipping item in unexpected state");
                    st.items.remove(pos);
                    return Step::Wait;
                }
            }
        }

        if st.delayed.is_empty() {
            st.is_processing = false;
            Step::Exit
        } else {
            Step::Wait
        }
    }

    /// Process one item inside a spawned task so a panic cannot kill the
    /// worker loop.
    async fn run_item(&self, item: QueueItem) {
        let job_id = item.job_id.clone();
        let processor = Arc::clone(&self.processor);

        let handle = tokio::spawn(async move {
            let mut item = item;
            let verdict = processor.process(&mut item).await;
            (item, verdict)
        });

        match handle.await {
            Ok((item, verdict)) => self.apply_verdict(item, verdict),
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(job_id = %job_id, "Item processing panicked, marking failed");
                } else {
                    error!(job_id = %job_id, "Item processing task cancelled, marking failed");
                }
                self.discard(&job_id);
            }
        }
    }

    fn apply_verdict(&self, item: QueueItem, verdict: ProcessVerdict) {
        let mut st = self.lock_state();
        let pos = st
            .items
            .iter()
            .position(|it| it.job_id == item.job_id && it.state == ItemState::Processing);
        let Some(pos) = pos else {
            warn!(job_id = %item.job_id, "Processed item is no longer tracked");
            return;
        };
        st.items.remove(pos);

        match verdict {
            ProcessVerdict::Completed | ProcessVerdict::Failed => {
                debug!(job_id = %item.job_id, state = %item.state, "Removing terminal item from queue");
            }
            ProcessVerdict::Requeue { delay } => {
                let ready_at = self.clock.now_millis() + delay.as_millis() as i64;
                st.delayed.push(DelayedItem { ready_at, item });
            }
        }
    }

    fn discard(&self, job_id: &JobId) {
        let mut st = self.lock_state();
        if let Some(pos) = st.items.iter().position(|it| it.job_id == *job_id) {
            st.items.remove(pos);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
