// Error Classifier
//
// Maps a raw failure into a typed retry decision. Pure and total: every
// error classifies to something, and unknown failures classify as
// retryable because most transient provider hiccups are indistinguishable
// from unknown failures.

use crate::application::constants::{RATE_LIMIT_SUGGESTED_DELAY_MS, TRANSIENT_SUGGESTED_DELAY_MS};
use crate::domain::{ClassifiedError, ErrorCategory};
use crate::error::EngineError;

/// Message tokens that indicate a transient transport failure
const NETWORK_TOKENS: &[&str] = &[
    "network",
    "timeout",
    "timed out",
    "connection reset",
    "connection refused",
    "connection closed",
    "broken pipe",
];

/// Classify a raw failure.
///
/// Pattern-based over the error's HTTP status (when one was observed) and
/// lowercased message. The rate-limit check runs first so a 429 with
/// "connection" in its body still counts as rate-limited.
pub fn classify(err: &EngineError) -> ClassifiedError {
    let status = err.status();
    let message = err.to_string().to_lowercase();

    if status == Some(429) || message.contains("too many requests") {
        return ClassifiedError::new(
            ErrorCategory::RateLimited,
            Some(RATE_LIMIT_SUGGESTED_DELAY_MS),
        );
    }

    // A billing/plan ceiling will not resolve itself; distinct from 429
    if message.contains("quota") || message.contains("resource exhausted") {
        return ClassifiedError::new(ErrorCategory::QuotaExhausted, None);
    }

    if NETWORK_TOKENS.iter().any(|t| message.contains(t)) {
        return ClassifiedError::new(ErrorCategory::Network, Some(TRANSIENT_SUGGESTED_DELAY_MS));
    }

    if message.contains("invalid") || message.contains("validation") {
        return ClassifiedError::new(ErrorCategory::InvalidInput, None);
    }

    ClassifiedError::new(ErrorCategory::Unknown, Some(TRANSIENT_SUGGESTED_DELAY_MS))
}
