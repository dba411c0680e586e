// Bounded Retry Helper
//
// Wraps an individual provider call (submit, poll) with a small retry
// budget, independent of the item-level re-enqueue budget. Transient
// provider errors are absorbed here without forcing a full item restart.

use crate::application::backoff::BackoffPolicy;
use crate::application::classify::classify;
use crate::error::Result;
use crate::port::Sleeper;
use std::future::Future;
use tracing::warn;

/// Attempt `operation` up to `max_attempts` times.
///
/// Between attempts the failure is classified and the backoff delay (or
/// the classifier's suggested delay) is slept through the injected
/// `Sleeper`. A non-retryable classification aborts immediately without
/// exhausting the budget. The final failure is returned as-is, so the
/// caller sees the original error, not a wrapper.
pub async fn retry_with_backoff<T, F, Fut>(
    sleeper: &dyn Sleeper,
    max_attempts: u32,
    base_delay_ms: i64,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let policy = BackoffPolicy::new(base_delay_ms, max_attempts);
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                let classified = classify(&err);

                if !classified.retryable {
                    warn!(
                        attempt = attempt,
                        category = %classified.category,
                        error = %err,
                        "Aborting retries: error is not retryable"
                    );
                    return Err(err);
                }
                if attempt >= max_attempts {
                    warn!(
                        attempts = attempt,
                        category = %classified.category,
                        error = %err,
                        "Retry budget exhausted"
                    );
                    return Err(err);
                }

                let delay = policy.next_delay(attempt - 1, &classified);
                warn!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    category = %classified.category,
                    error = %err,
                    "Transient failure, retrying"
                );
                sleeper.sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::port::clock::mocks::TestClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn rate_limited() -> EngineError {
        EngineError::Provider {
            status: Some(429),
            message: "too many requests".to_string(),
        }
    }

    fn quota() -> EngineError {
        EngineError::provider("quota exceeded")
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let clock = TestClock::new(0);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let result = retry_with_backoff(&clock, 3, 10, || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(rate_limited())
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two waits, both the rate-limit suggested delay
        assert_eq!(
            clock.recorded_sleeps(),
            vec![Duration::from_millis(60_000), Duration::from_millis(60_000)]
        );
    }

    #[tokio::test]
    async fn test_non_retryable_aborts_without_sleeping() {
        let clock = TestClock::new(0);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let result: crate::error::Result<()> = retry_with_backoff(&clock, 5, 10, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(quota())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(clock.recorded_sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_original_error() {
        let clock = TestClock::new(0);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let result: crate::error::Result<()> = retry_with_backoff(&clock, 3, 10, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(rate_limited())
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(429));
    }
}
