// Application Layer - Use Cases and Business Logic

pub mod backoff;
pub mod classify;
pub mod constants;
pub mod generation;
pub mod processor;
pub mod queue;
pub mod retry;

// Re-exports
pub use backoff::BackoffPolicy;
pub use classify::classify;
pub use constants::EngineConfig;
pub use generation::{GenerationClient, UnitOutcome};
pub use processor::{JobProcessor, ProcessVerdict};
pub use queue::{ItemSnapshot, QueueManager, SubmitOutcome};
pub use retry::retry_with_backoff;
