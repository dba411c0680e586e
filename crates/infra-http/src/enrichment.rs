// HTTP Enrichment Adapter
//
// Short text-generation call: raw description in, refined generation
// instruction out. The provider may legitimately return an empty string.

use crate::http::{error_for_status, map_transport_error};
use async_trait::async_trait;
use mediaforge_core::error::Result;
use mediaforge_core::port::EnrichmentProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct ExpandRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ExpandResponse {
    #[serde(default)]
    text: String,
}

pub struct HttpEnrichmentProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEnrichmentProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EnrichmentProvider for HttpEnrichmentProvider {
    async fn expand(&self, raw: &str) -> Result<String> {
        let url = format!("{}/v1/expand", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ExpandRequest { prompt: raw })
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = error_for_status(response).await?;
        let body: ExpandResponse = response.json().await.map_err(map_transport_error)?;

        debug!(chars = body.text.len(), "Enrichment call returned");
        Ok(body.text)
    }
}
