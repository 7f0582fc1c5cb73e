//! Image preparation for the inference request: bounded downscaling, JPEG
//! compression and base64 text encoding.

pub mod config;
pub mod encode;
pub mod errors;
pub mod raw_image;
pub mod resize;

use common::span;
use schema::EncodedImagePayload;

pub use config::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION};
pub use encode::{decode, decode_bytes, encode};
pub use errors::CodecError;
pub use raw_image::RawImage;
pub use resize::resize;

/// Resize bounds and compression quality applied to every outbound image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCodec {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl ImageCodec {
    pub fn new(max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            max_width,
            max_height,
            quality,
        }
    }

    /// Resize then encode.
    pub fn prepare(&self, image: &RawImage) -> Result<EncodedImagePayload, CodecError> {
        let _s = span!("prepare_image");

        let resized = resize(image, self.max_width, self.max_height)?;
        encode(&resized, self.quality)
    }
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_DIMENSION,
            DEFAULT_MAX_DIMENSION,
            DEFAULT_JPEG_QUALITY,
        )
    }
}
