// Central Error Type for the Engine

use thiserror::Error;

/// Engine-level error type.
///
/// Remote collaborator failures land in `Provider` with whatever status
/// code and message the adapter could salvage; the classifier reads both.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Provider error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },

    #[error("Record store error: {0}")]
    RecordStore(String),

    #[error("Artifact store error: {0}")]
    ArtifactStore(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Shorthand for a provider failure without an HTTP status
    pub fn provider(message: impl Into<String>) -> Self {
        EngineError::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status of the underlying failure, when one was observed
    pub fn status(&self) -> Option<u16> {
        match self {
            EngineError::Provider { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

// Note: sqlx/reqwest conversions live in the infra crates (orphan rules);
// they map into RecordStore / Provider by hand.
