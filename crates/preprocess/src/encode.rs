use crate::{RawImage, errors::CodecError};
use base64::{Engine, engine::general_purpose::STANDARD};
use common::span_debug;
use image::codecs::jpeg::JpegEncoder;
use schema::EncodedImagePayload;

/// Compress `image` as JPEG at `quality` and base64 the bytes.
///
/// Quality is on a 0-100 scale; 0 is treated as 1. Output is deterministic
/// for a given image and quality.
pub fn encode(image: &RawImage, quality: u8) -> Result<EncodedImagePayload, CodecError> {
    let _s = span_debug!("encode");

    let jpeg = encode_jpeg(image, quality)?;
    let data = STANDARD.encode(&jpeg);

    tracing::debug!(
        jpeg_bytes = jpeg.len(),
        payload_bytes = data.len(),
        quality,
        "Encoded image payload"
    );

    Ok(EncodedImagePayload::jpeg_base64(data))
}

pub fn encode_jpeg(image: &RawImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CodecError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(image.as_rgb8())
        .map_err(CodecError::Encode)?;

    Ok(jpeg)
}

/// Turn a base64 payload (e.g. the annotated image sent back by the service)
/// into pixels. Line breaks and other whitespace inside the text are ignored.
pub fn decode(payload: &EncodedImagePayload) -> Result<RawImage, CodecError> {
    let _s = span_debug!("decode");

    let bytes = decode_bytes(payload)?;
    RawImage::decode(&bytes)
}

/// Base64-decode the payload without interpreting the image. Line breaks
/// and other ASCII whitespace in the text are ignored.
pub fn decode_bytes(payload: &EncodedImagePayload) -> Result<Vec<u8>, CodecError> {
    let compact: String = payload
        .data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    Ok(STANDARD.decode(compact)?)
}
