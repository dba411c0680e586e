// Engine constants (no magic values)

use std::time::Duration;

/// Wait between consecutive provider-bound units within one item.
/// This pacing is the dominant rate-limit defense; the generation provider
/// accepts roughly one request per window.
pub const DEFAULT_UNIT_DELAY: Duration = Duration::from_secs(8);

/// Wait between status polls of a submitted generation job (5s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll budget per generation job (120 polls ~= 10 minutes at 5s)
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Attempts per individual provider call (submit/poll) before the error
/// escalates to the unit level
pub const DEFAULT_CALL_RETRY_ATTEMPTS: u32 = 3;

/// Base backoff delay for provider-call retries (1s)
pub const DEFAULT_CALL_RETRY_BASE_DELAY_MS: i64 = 1000;

/// Full re-enqueue ceiling per item
pub const DEFAULT_MAX_ITEM_RETRIES: u32 = 3;

/// Base backoff delay for item re-enqueues (1s)
pub const DEFAULT_ITEM_RETRY_BASE_DELAY_MS: i64 = 1000;

/// Provider-suggested wait after a 429 (rate-limit windows are a minute)
pub const RATE_LIMIT_SUGGESTED_DELAY_MS: i64 = 60_000;

/// Suggested wait for network-ish and unknown transient failures
pub const TRANSIENT_SUGGESTED_DELAY_MS: i64 = 30_000;

/// Sleep between worker wake-ups while only delayed items remain (100ms)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_millis(100);

/// Engine tuning knobs, threaded through client/processor/manager wiring
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub unit_delay: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub call_retry_attempts: u32,
    pub call_retry_base_delay_ms: i64,
    pub max_item_retries: u32,
    pub item_retry_base_delay_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unit_delay: DEFAULT_UNIT_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            call_retry_attempts: DEFAULT_CALL_RETRY_ATTEMPTS,
            call_retry_base_delay_ms: DEFAULT_CALL_RETRY_BASE_DELAY_MS,
            max_item_retries: DEFAULT_MAX_ITEM_RETRIES,
            item_retry_base_delay_ms: DEFAULT_ITEM_RETRY_BASE_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Fast configuration for tests: millisecond pacing, tiny poll budget
    pub fn for_tests() -> Self {
        Self {
            unit_delay: Duration::from_millis(3),
            poll_interval: Duration::from_millis(1),
            max_poll_attempts: 10,
            call_retry_attempts: 3,
            call_retry_base_delay_ms: 1,
            max_item_retries: 3,
            item_retry_base_delay_ms: 1,
        }
    }
}
