// Backoff Policy

use crate::application::constants::{DEFAULT_ITEM_RETRY_BASE_DELAY_MS, DEFAULT_MAX_ITEM_RETRIES};
use crate::domain::ClassifiedError;
use std::time::Duration;

/// Computes the wait before a retry.
///
/// A classifier-suggested delay is used verbatim; provider-specific
/// signals (rate-limit windows) beat a generic curve. Without one the
/// delay is `base * 2^attempt`. The caller enforces `max_retries`.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub base_delay_ms: i64,
    pub max_retries: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_ITEM_RETRY_BASE_DELAY_MS,
            max_retries: DEFAULT_MAX_ITEM_RETRIES,
        }
    }
}

impl BackoffPolicy {
    pub fn new(base_delay_ms: i64, max_retries: u32) -> Self {
        Self {
            base_delay_ms,
            max_retries,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn next_delay(&self, attempt: u32, classified: &ClassifiedError) -> Duration {
        if let Some(suggested_ms) = classified.suggested_delay_ms {
            return Duration::from_millis(suggested_ms.max(0) as u64);
        }
        let delay_ms = (self.base_delay_ms.max(0) as u64)
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCategory;

    fn unsuggested() -> ClassifiedError {
        ClassifiedError::new(ErrorCategory::Unknown, None)
    }

    #[test]
    fn test_exponential_curve_without_suggestion() {
        let policy = BackoffPolicy::new(1000, 3);
        assert_eq!(policy.next_delay(0, &unsuggested()), Duration::from_millis(1000));
        assert_eq!(policy.next_delay(1, &unsuggested()), Duration::from_millis(2000));
        assert_eq!(policy.next_delay(2, &unsuggested()), Duration::from_millis(4000));
        assert_eq!(policy.next_delay(3, &unsuggested()), Duration::from_millis(8000));
    }

    #[test]
    fn test_suggested_delay_used_verbatim() {
        let policy = BackoffPolicy::new(1000, 3);
        let classified = ClassifiedError::new(ErrorCategory::RateLimited, Some(60_000));
        // Attempt number is irrelevant when the classifier spoke
        assert_eq!(policy.next_delay(5, &classified), Duration::from_millis(60_000));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let policy = BackoffPolicy::new(1000, 3);
        let d = policy.next_delay(200, &unsuggested());
        assert!(d >= Duration::from_millis(1000));
    }
}
