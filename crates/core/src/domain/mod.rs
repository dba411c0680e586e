// Domain Layer - Pure business logic and entities

pub mod error;
pub mod failure;
pub mod item;
pub mod unit;

// Re-exports
pub use error::DomainError;
pub use failure::{ClassifiedError, ErrorCategory};
pub use item::{ItemState, JobId, QueueItem};
pub use unit::{UnitInput, UnitResult};
