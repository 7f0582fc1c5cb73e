//! Shared data formats: the domain model produced by the detection pipeline
//! and the JSON wire format spoken with the remote inference service.

pub mod detection;
pub mod request;
pub mod response;
pub mod secret;

pub use detection::{
    BoundingBox, DetectedObject, DetectionResult, EncodedImagePayload, ImageDimensions, MimeHint,
    PayloadEncoding,
};
pub use request::{ImageInput, InferenceRequest, RequestInputs};
pub use response::{
    Base64Image, ModelPredictions, Prediction, PredictionImage, WorkflowOutput,
    WorkflowOutputsResponse,
};
pub use secret::ApiKey;
