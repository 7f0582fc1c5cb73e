use crate::errors::InferenceError;
use async_trait::async_trait;
use schema::{ApiKey, EncodedImagePayload, WorkflowOutputsResponse};

pub mod http;

pub use http::HttpInferenceClient;

/// Remote object-detection workflow.
///
/// One call is one request: implementations do not retry and do not recover
/// locally; every failure is returned to the caller.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn detect(
        &self,
        payload: &EncodedImagePayload,
        credential: &ApiKey,
    ) -> Result<WorkflowOutputsResponse, InferenceError>;
}

#[async_trait]
impl<C: InferenceClient + ?Sized> InferenceClient for std::sync::Arc<C> {
    async fn detect(
        &self,
        payload: &EncodedImagePayload,
        credential: &ApiKey,
    ) -> Result<WorkflowOutputsResponse, InferenceError> {
        (**self).detect(payload, credential).await
    }
}
