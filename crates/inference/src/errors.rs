use preprocess::CodecError;
use thiserror::Error;

/// Failure category surfaced to observers of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The image could not be resized or encoded.
    Codec,
    /// Transport failure or the service refused the request.
    Network,
    /// The response body was malformed or had an unexpected shape.
    Decode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Codec => "codec",
            ErrorKind::Network => "network",
            ErrorKind::Decode => "decode",
        }
    }
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode inference response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::Network(_) | InferenceError::Status { .. } => ErrorKind::Network,
            InferenceError::Decode(_) => ErrorKind::Decode,
        }
    }
}

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl DetectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectionError::Codec(_) => ErrorKind::Codec,
            DetectionError::Inference(e) => e.kind(),
        }
    }
}
