//! Pixel resampling used to rasterize exports above on-screen resolution.
//!
//! All functions return new `PixelBuffer` instances without modifying the input,
//! and keep the input's channel layout.

use super::{DecodeError, FilterType, PixelBuffer};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero target dimension and
/// `DecodeError::MalformedBuffer` if the source samples don't match its size.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelBuffer, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    image.validate()?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let dynamic = image.to_dynamic_image().ok_or(DecodeError::InvalidFormat)?;
    let resized = dynamic.resize_exact(width, height, filter.to_image_filter());

    // Resampling keeps the color type, so the layout survives the round trip
    Ok(PixelBuffer::from_dynamic_image(resized))
}

/// Largest output, in pixels, a resample may produce (about 536 megapixels).
pub const MAX_RESAMPLE_PIXELS: u64 = 1 << 29;

/// Target size for scaling `width`×`height` by `factor`.
///
/// Each dimension is rounded and never goes below 1 pixel. Returns `None`
/// for a non-positive or non-finite factor, or when the result would exceed
/// [`MAX_RESAMPLE_PIXELS`].
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> Option<(u32, u32)> {
    if !factor.is_finite() || factor <= 0.0 {
        return None;
    }
    let target_width = (width as f64 * factor).round().max(1.0);
    let target_height = (height as f64 * factor).round().max(1.0);
    if target_width * target_height > MAX_RESAMPLE_PIXELS as f64 {
        return None;
    }
    Some((target_width as u32, target_height as u32))
}

/// Uniformly scale an image by `factor`.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` when [`scaled_dimensions`] rejects
/// the factor.
pub fn scale_by(
    image: &PixelBuffer,
    factor: f64,
    filter: FilterType,
) -> Result<PixelBuffer, DecodeError> {
    let (width, height) =
        scaled_dimensions(image.width, image.height, factor).ok_or(DecodeError::InvalidFormat)?;
    resize(image, width, height, filter)
}
