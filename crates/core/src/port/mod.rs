// Port Layer - Interfaces for external dependencies

pub mod artifact_store;
pub mod clock; // For deterministic testing
pub mod enrichment;
pub mod generation;
pub mod record_store;

// Re-exports
pub use artifact_store::ArtifactStore;
pub use clock::{Clock, Sleeper, SystemClock, TokioSleeper};
pub use enrichment::EnrichmentProvider;
pub use generation::{GenerationProvider, JobHandle, PollStatus};
pub use record_store::RecordStore;
