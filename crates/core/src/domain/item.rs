// Queue Item Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};
use crate::domain::unit::UnitInput;

/// Job ID (opaque identifier of the record the item was expanded from)
pub type JobId = String;

/// Queue item lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemState::Pending => write!(f, "PENDING"),
            ItemState::Processing => write!(f, "PROCESSING"),
            ItemState::Completed => write!(f, "COMPLETED"),
            ItemState::Failed => write!(f, "FAILED"),
        }
    }
}

/// One enqueued generation job: an ordered list of units plus retry bookkeeping.
///
/// At most one item per `job_id` may be PENDING or PROCESSING at a time;
/// admission enforces this, the entity only tracks its own lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub job_id: JobId,
    pub units: Vec<UnitInput>,
    pub state: ItemState,
    pub retry_count: u32,
    /// Epoch ms; refreshed on every re-enqueue
    pub enqueued_at: i64,
}

impl QueueItem {
    pub fn new(job_id: impl Into<JobId>, units: Vec<UnitInput>, enqueued_at: i64) -> Self {
        Self {
            job_id: job_id.into(),
            units,
            state: ItemState::Pending,
            retry_count: 0,
            enqueued_at,
        }
    }

    /// True while the item occupies its job_id slot for de-duplication
    pub fn is_live(&self) -> bool {
        matches!(self.state, ItemState::Pending | ItemState::Processing)
    }

    /// Transition to Processing
    pub fn begin_processing(&mut self) -> Result<()> {
        if self.state != ItemState::Pending {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "PROCESSING".to_string(),
            });
        }
        self.state = ItemState::Processing;
        Ok(())
    }

    /// Transition to Completed (terminal)
    pub fn complete(&mut self) -> Result<()> {
        if self.state != ItemState::Processing {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "COMPLETED".to_string(),
            });
        }
        self.state = ItemState::Completed;
        Ok(())
    }

    /// Transition to Failed (terminal)
    pub fn fail(&mut self) {
        self.state = ItemState::Failed;
    }

    /// Put the item back in line for another full attempt.
    ///
    /// Bumps the retry counter and refreshes the enqueue timestamp so the
    /// item lines up at the tail, never at its original position.
    pub fn requeue(&mut self, now_millis: i64) {
        self.retry_count += 1;
        self.state = ItemState::Pending;
        self.enqueued_at = now_millis;
    }
}
