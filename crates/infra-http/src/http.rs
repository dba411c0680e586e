// Shared request plumbing for the provider adapters

use mediaforge_core::error::{EngineError, Result};

/// Map a transport-level failure (connect, timeout, decode) into a
/// provider error. reqwest's own wording carries the tokens the
/// classifier looks for ("timed out", "connection").
pub(crate) fn map_transport_error(err: reqwest::Error) -> EngineError {
    EngineError::Provider {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

/// Turn a non-2xx response into a provider error carrying the HTTP status
/// and response body, so a 429 classifies as rate-limited without any
/// adapter-side logic.
pub(crate) async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };

    Err(EngineError::Provider {
        status: Some(code),
        message,
    })
}
