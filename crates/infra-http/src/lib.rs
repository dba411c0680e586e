// Mediaforge Infrastructure - HTTP Adapters
// Implements: EnrichmentProvider, GenerationProvider, ArtifactStore

mod artifact;
mod enrichment;
mod generation;
mod http;

pub use artifact::{HttpArtifactStore, HttpArtifactStoreConfig};
pub use enrichment::HttpEnrichmentProvider;
pub use generation::HttpGenerationProvider;
