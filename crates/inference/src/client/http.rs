use super::InferenceClient;
use crate::errors::InferenceError;
use async_trait::async_trait;
use reqwest::Client;
use schema::{ApiKey, EncodedImagePayload, InferenceRequest, WorkflowOutputsResponse};
use std::time::Instant;

/// Longest slice of an error body kept in [`InferenceError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Workflow client speaking JSON over HTTP POST.
///
/// No timeout is configured here; the transport defaults apply.
pub struct HttpInferenceClient {
    client: Client,
    endpoint: String,
}

impl HttpInferenceClient {
    pub fn new(endpoint: &str) -> Result<Self, InferenceError> {
        let client = Client::builder().build().map_err(InferenceError::Network)?;
        Ok(Self::with_client(client, endpoint))
    }

    /// `endpoint` is used verbatim as the POST target.
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        tracing::info!(endpoint, "Inference client configured");

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint, payload_bytes = payload.len()))]
    async fn detect(
        &self,
        payload: &EncodedImagePayload,
        credential: &ApiKey,
    ) -> Result<WorkflowOutputsResponse, InferenceError> {
        let request = InferenceRequest::new(credential, payload);
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(InferenceError::Network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(InferenceError::Network)?;

        tracing::debug!(
            status = status.as_u16(),
            body_bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Inference response received"
        );

        if !status.is_success() {
            let body: String = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            tracing::warn!(status = status.as_u16(), "Inference service rejected request");
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&body).map_err(InferenceError::Decode)
    }
}
