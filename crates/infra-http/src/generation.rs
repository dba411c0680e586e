// HTTP Generation Adapter
//
// Long-running render jobs: POST to submit, GET to poll, GET to download
// produced artifacts.

use crate::http::{error_for_status, map_transport_error};
use async_trait::async_trait;
use mediaforge_core::error::{EngineError, Result};
use mediaforge_core::port::{GenerationProvider, JobHandle, PollStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct RenderStatusResponse {
    status: String,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RenderStatusResponse {
    /// Provider statuses: queued | running | succeeded | failed.
    /// A failed render surfaces the provider's message as the raw error.
    fn into_poll_status(self) -> Result<PollStatus> {
        match self.status.as_str() {
            "succeeded" => Ok(PollStatus::finished(self.outputs)),
            "failed" => Err(EngineError::provider(
                self.error
                    .unwrap_or_else(|| "generation failed without detail".to_string()),
            )),
            _ => Ok(PollStatus::running()),
        }
    }
}

pub struct HttpGenerationProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGenerationProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    async fn submit(&self, instruction: &str) -> Result<JobHandle> {
        let url = format!("{}/v1/renders", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SubmitRequest {
                prompt: instruction,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = error_for_status(response).await?;
        let body: SubmitResponse = response.json().await.map_err(map_transport_error)?;

        debug!(render_id = %body.id, "Render job submitted");
        Ok(JobHandle::new(body.id))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<PollStatus> {
        let url = format!("{}/v1/renders/{}", self.base_url, handle);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = error_for_status(response).await?;
        let body: RenderStatusResponse = response.json().await.map_err(map_transport_error)?;

        body.into_poll_status()
    }

    async fn fetch_artifact(&self, uri: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = error_for_status(response).await?;
        let bytes = response.bytes().await.map_err(map_transport_error)?;

        Ok(bytes.to_vec())
    }
}
