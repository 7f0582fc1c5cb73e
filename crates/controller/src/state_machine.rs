use inference::DetectionError;
use schema::DetectionResult;
use std::sync::Arc;

/// Message used when an error carries no description of its own.
pub const FAILURE_FALLBACK: &str = "Detection failed";

/// What the UI renders for the current photo.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetectionState {
    #[default]
    Idle,
    Loading,
    Success(Arc<DetectionResult>),
    Failure(String),
}

impl DetectionState {
    /// Terminal state for one detection run.
    pub fn from_outcome(outcome: Result<DetectionResult, DetectionError>) -> Self {
        match outcome {
            Ok(result) => DetectionState::Success(Arc::new(result)),
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Detection failed");
                DetectionState::failure(e.to_string())
            }
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            DetectionState::Failure(FAILURE_FALLBACK.to_string())
        } else {
            DetectionState::Failure(message)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DetectionState::Idle => "idle",
            DetectionState::Loading => "loading",
            DetectionState::Success(_) => "success",
            DetectionState::Failure(_) => "failure",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DetectionState::Loading)
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            DetectionState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DetectionState::Failure(message) => Some(message),
            _ => None,
        }
    }
}
