use crate::errors::CodecError;
use image::{DynamicImage, RgbImage};
use std::fmt;
use std::path::Path;

/// In-memory RGB8 pixel buffer handed to the pipeline by the caller.
#[derive(Clone, PartialEq)]
pub struct RawImage {
    pixels: RgbImage,
}

impl RawImage {
    /// Wrap tightly packed RGB8 (HWC) pixels.
    pub fn from_rgb8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CodecError> {
        let expected = width as usize * height as usize * 3;
        let actual = pixels.len();

        RgbImage::from_raw(width, height, pixels)
            .filter(|_| actual == expected)
            .map(|pixels| Self { pixels })
            .ok_or(CodecError::InvalidBuffer { expected, actual })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgb8(),
        }
    }

    /// Decode an encoded image (JPEG or PNG).
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        image::load_from_memory(bytes)
            .map(Self::from_dynamic)
            .map_err(CodecError::Decode)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        image::open(path)
            .map(Self::from_dynamic)
            .map_err(CodecError::Decode)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgb8(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.pixels
    }
}

impl From<RgbImage> for RawImage {
    fn from(pixels: RgbImage) -> Self {
        Self { pixels }
    }
}

impl fmt::Debug for RawImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb8_accepts_exact_buffer() {
        let image = RawImage::from_rgb8(4, 2, vec![0u8; 4 * 2 * 3]).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        assert_eq!(image.as_bytes().len(), 24);
    }

    #[test]
    fn test_from_rgb8_rejects_short_buffer() {
        match RawImage::from_rgb8(4, 2, vec![0u8; 10]) {
            Err(CodecError::InvalidBuffer { expected, actual }) => {
                assert_eq!(expected, 24);
                assert_eq!(actual, 10);
            }
            other => panic!("Expected InvalidBuffer, got {:?}", other),
        }
    }

    #[test]
    fn test_from_rgb8_rejects_oversized_buffer() {
        assert!(matches!(
            RawImage::from_rgb8(1, 1, vec![0u8; 6]),
            Err(CodecError::InvalidBuffer { .. })
        ));
    }

    #[test]
    fn test_from_dynamic_converts_rgba() {
        let rgba = DynamicImage::new_rgba8(3, 5);
        let image = RawImage::from_dynamic(rgba);
        assert_eq!((image.width(), image.height()), (3, 5));
        assert_eq!(image.as_bytes().len(), 3 * 5 * 3);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            RawImage::decode(b"definitely not an image"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_debug_omits_pixels() {
        let image = RawImage::from_rgb8(2, 2, vec![7u8; 12]).unwrap();
        assert_eq!(format!("{:?}", image), "RawImage { width: 2, height: 2, .. }");
    }
}
