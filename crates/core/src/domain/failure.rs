// Classified Failure Model

use serde::{Deserialize, Serialize};

/// Failure taxonomy for provider/storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    RateLimited,
    QuotaExhausted,
    Network,
    InvalidInput,
    Unknown,
}

impl ErrorCategory {
    /// Retryability is a function of the category alone.
    ///
    /// Quota ceilings and input validation cannot resolve themselves, so
    /// retrying them only burns the rate-limited request budget.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorCategory::QuotaExhausted | ErrorCategory::InvalidInput)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::RateLimited => write!(f, "RATE_LIMITED"),
            ErrorCategory::QuotaExhausted => write!(f, "QUOTA_EXHAUSTED"),
            ErrorCategory::Network => write!(f, "NETWORK"),
            ErrorCategory::InvalidInput => write!(f, "INVALID_INPUT"),
            ErrorCategory::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A raw failure mapped into a retry policy decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub retryable: bool,
    /// Provider-suggested wait; present only for retryable categories
    pub suggested_delay_ms: Option<i64>,
}

impl ClassifiedError {
    pub fn new(category: ErrorCategory, suggested_delay_ms: Option<i64>) -> Self {
        let retryable = category.is_retryable();
        Self {
            category,
            retryable,
            suggested_delay_ms: if retryable { suggested_delay_ms } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_follows_category() {
        assert!(ErrorCategory::RateLimited.is_retryable());
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Unknown.is_retryable());
        assert!(!ErrorCategory::QuotaExhausted.is_retryable());
        assert!(!ErrorCategory::InvalidInput.is_retryable());
    }

    #[test]
    fn test_non_retryable_drops_suggested_delay() {
        let c = ClassifiedError::new(ErrorCategory::QuotaExhausted, Some(60_000));
        assert!(!c.retryable);
        assert_eq!(c.suggested_delay_ms, None);
    }
}
