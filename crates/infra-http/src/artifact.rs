// HTTP Artifact Store Adapter
//
// Uploads artifact bytes to the storage service and returns the public
// URL they become retrievable under.

use crate::http::{error_for_status, map_transport_error};
use async_trait::async_trait;
use mediaforge_core::error::Result;
use mediaforge_core::port::ArtifactStore;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpArtifactStoreConfig {
    /// Upload endpoint base, e.g. `https://storage.internal/buckets/renders`
    pub upload_base: String,
    /// Public base the stored object is served from
    pub public_base: String,
}

pub struct HttpArtifactStore {
    client: reqwest::Client,
    config: HttpArtifactStoreConfig,
}

impl HttpArtifactStore {
    pub fn new(client: reqwest::Client, config: HttpArtifactStoreConfig) -> Self {
        Self { client, config }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn store(&self, bytes: Vec<u8>, path: &str) -> Result<String> {
        let url = join_url(&self.config.upload_base, path);
        let size = bytes.len();

        let response = self
            .client
            .put(&url)
            .body(bytes)
            .send()
            .await
            .map_err(map_transport_error)?;
        error_for_status(response).await?;

        let public_ref = join_url(&self.config.public_base, path);
        debug!(path = %path, bytes = size, "Artifact stored");
        Ok(public_ref)
    }
}
