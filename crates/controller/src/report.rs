use crate::state_machine::DetectionState;
use schema::{DetectedObject, ImageDimensions};
use serde::Serialize;

/// JSON summary of a finished detection, printed by the `detect` binary.
///
/// The annotated image itself is left out; only its encoded size is
/// reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport<'a> {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_image: Option<ImageDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image_bytes: Option<usize>,
    pub detections: &'a [DetectedObject],
}

impl<'a> DetectionReport<'a> {
    pub fn from_state(state: &'a DetectionState) -> Self {
        let result = state.result();
        Self {
            state: state.name(),
            error: state.error(),
            object_count: result.and_then(|r| r.object_count),
            prediction_image: result.and_then(|r| r.prediction_image),
            annotated_image_bytes: result
                .and_then(|r| r.annotated_image.as_ref())
                .map(|image| image.len()),
            detections: result.map(|r| r.detections.as_slice()).unwrap_or(&[]),
        }
    }
}
