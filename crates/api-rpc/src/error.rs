//! RPC Error Types
//!
//! Maps engine errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use mediaforge_core::error::EngineError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const THROTTLED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const STORE_ERROR: i32 = 5001;
    pub const PROVIDER_ERROR: i32 = 5002;
}

/// Convert EngineError to a JSON-RPC ErrorObject
pub fn to_rpc_error(err: EngineError) -> ErrorObjectOwned {
    match err {
        EngineError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        EngineError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        EngineError::RecordStore(msg) => ErrorObjectOwned::owned(code::STORE_ERROR, msg, None::<()>),
        EngineError::ArtifactStore(msg) => {
            ErrorObjectOwned::owned(code::STORE_ERROR, msg, None::<()>)
        }
        EngineError::Provider { .. } => {
            ErrorObjectOwned::owned(code::PROVIDER_ERROR, err.to_string(), None::<()>)
        }
        EngineError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        EngineError::Io(e) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>),
        EngineError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        EngineError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}

/// Error for a rate-limited caller
pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}
