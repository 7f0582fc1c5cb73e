use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    Base64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeHint {
    Jpeg,
}

/// Transport encoding of an image: text-encoded compressed bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImagePayload {
    pub encoding: PayloadEncoding,
    pub mime_hint: MimeHint,
    pub data: String,
}

impl EncodedImagePayload {
    pub fn jpeg_base64(data: impl Into<String>) -> Self {
        Self {
            encoding: PayloadEncoding::Base64,
            mime_hint: MimeHint::Jpeg,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Corner-format box in pixel space of the submitted image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

/// Size reported by the service for the image it ran the model on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub annotated_image: Option<EncodedImagePayload>,
    pub detections: Vec<DetectedObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_image: Option<ImageDimensions>,
}

impl DetectionResult {
    /// Result for a response that carried no outputs at all.
    pub fn empty() -> Self {
        Self::default()
    }
}
