use crate::{RawImage, errors::CodecError};
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use std::borrow::Cow;

/// Downscale `image` so it fits within `max_width` x `max_height`.
///
/// Images already within bounds are returned borrowed. Otherwise the aspect
/// ratio is kept and the longer side (width for landscape, height for
/// portrait or square) is pinned to its bound; the other side is truncated.
pub fn resize(
    image: &RawImage,
    max_width: u32,
    max_height: u32,
) -> Result<Cow<'_, RawImage>, CodecError> {
    let _s = span!("resize");

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions { width, height });
    }

    if width <= max_width && height <= max_height {
        return Ok(Cow::Borrowed(image));
    }

    let (new_width, new_height) = target_dimensions(width, height, max_width, max_height);
    if new_width == 0 || new_height == 0 {
        return Err(CodecError::InvalidDimensions {
            width: new_width,
            height: new_height,
        });
    }

    tracing::debug!(
        width,
        height,
        new_width,
        new_height,
        "Downscaling image to fit bounds"
    );

    let src = ImageRef::new(width, height, image.as_bytes(), PixelType::U8x3)
        .map_err(|e| CodecError::Resize(e.to_string()))?;

    let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

    Resizer::new()
        .resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )
        .map_err(|e| CodecError::Resize(e.to_string()))?;

    RawImage::from_rgb8(new_width, new_height, resized.buffer().to_vec()).map(Cow::Owned)
}

/// Output size for an image that exceeds its bounds.
pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let aspect_ratio = width as f32 / height as f32;

    if aspect_ratio > 1.0 {
        (max_width, (max_width as f32 / aspect_ratio) as u32)
    } else {
        ((max_height as f32 * aspect_ratio) as u32, max_height)
    }
}
