use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}
