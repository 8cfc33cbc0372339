//! Crop selection mapping and pixel cropping.
//!
//! The user drags a rectangle over the rendered view. Those coordinates live in
//! display space: they include the view's layout offset and are scaled by how
//! large the image is drawn. [`map_crop_to_image_space`] turns such a drag into
//! a pixel rectangle of the underlying buffer, and [`apply_crop`] copies that
//! rectangle into a new buffer.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner in both spaces
//! - A drag may run in any direction; start may be greater than end on either axis
//! - Image-space rectangles are whole pixels, truncated toward the origin

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::PixelBuffer;

/// Smallest drag, in display units on either axis, that counts as a crop.
pub const MIN_CROP_EXTENT: f64 = 5.0;

/// Reasons a crop request is refused. None of them mutate anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    /// The dragged rectangle is narrower or shorter than [`MIN_CROP_EXTENT`].
    #[error("Crop area is too small: {width:.1}x{height:.1} (minimum {})", MIN_CROP_EXTENT)]
    RegionTooSmall { width: f64, height: f64 },

    /// The view has no usable size, so display units can't be mapped.
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    /// The mapped rectangle starts outside the image or has no area left.
    #[error("Invalid crop area")]
    InvalidRegion,

    /// The source buffer's samples don't match its dimensions.
    #[error("Malformed source buffer: expected {expected} bytes, got {actual}")]
    MalformedSource { expected: usize, actual: usize },
}

/// A rectangle as the user dragged it, in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl DisplayRect {
    pub fn new(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// Width after normalizing the drag direction.
    pub fn width(&self) -> f64 {
        (self.end_x - self.start_x).abs()
    }

    /// Height after normalizing the drag direction.
    pub fn height(&self) -> f64 {
        (self.end_y - self.start_y).abs()
    }

    /// Top-left corner after normalizing the drag direction.
    pub fn min_corner(&self) -> (f64, f64) {
        (self.start_x.min(self.end_x), self.start_y.min(self.end_y))
    }

    fn is_finite(&self) -> bool {
        self.start_x.is_finite()
            && self.start_y.is_finite()
            && self.end_x.is_finite()
            && self.end_y.is_finite()
    }
}

/// Where and how large the image is drawn, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Drawn width of the image.
    pub width: f64,
    /// Drawn height of the image.
    pub height: f64,
    /// Layout offset of the drawn image's left edge.
    pub offset_x: f64,
    /// Layout offset of the drawn image's top edge.
    pub offset_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            width,
            height,
            offset_x,
            offset_y,
        }
    }
}

/// A pixel rectangle inside an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ImageRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if the rectangle has area and lies entirely within `width`x`height`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Map a dragged display rectangle to pixel bounds of the image.
///
/// The minimum corner is translated by the viewport offset and both the corner
/// and the extent are scaled by `image / viewport` on each axis. A rectangle
/// that runs past the right or bottom edge is shrunk to fit; its origin is
/// never shifted.
///
/// # Errors
///
/// - `RegionTooSmall` if the drag is under [`MIN_CROP_EXTENT`] on either axis
/// - `InvalidViewport` if the viewport width or height is not positive
/// - `InvalidRegion` if the mapped origin is negative or nothing is left after clamping
pub fn map_crop_to_image_space(
    rect: &DisplayRect,
    viewport: &Viewport,
    image_width: u32,
    image_height: u32,
) -> Result<ImageRect, CropError> {
    if !rect.is_finite() {
        return Err(CropError::InvalidRegion);
    }

    let width = rect.width();
    let height = rect.height();
    if width < MIN_CROP_EXTENT || height < MIN_CROP_EXTENT {
        return Err(CropError::RegionTooSmall { width, height });
    }

    let viewport_usable = viewport.width.is_finite()
        && viewport.height.is_finite()
        && viewport.width > 0.0
        && viewport.height > 0.0;
    if !viewport_usable {
        return Err(CropError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let image_w = image_width as f64;
    let image_h = image_height as f64;
    let scale_x = image_w / viewport.width;
    let scale_y = image_h / viewport.height;

    let (min_x, min_y) = rect.min_corner();
    let origin_x = (min_x - viewport.offset_x) * scale_x;
    let origin_y = (min_y - viewport.offset_y) * scale_y;
    let mut crop_w = width * scale_x;
    let mut crop_h = height * scale_y;

    if origin_x + crop_w > image_w {
        crop_w = image_w - origin_x;
    }
    if origin_y + crop_h > image_h {
        crop_h = image_h - origin_y;
    }

    if origin_x < 0.0 || origin_y < 0.0 || crop_w <= 0.0 || crop_h <= 0.0 {
        return Err(CropError::InvalidRegion);
    }

    let mapped = ImageRect::new(
        origin_x as u32,
        origin_y as u32,
        crop_w as u32,
        crop_h as u32,
    );
    // Sub-pixel slivers truncate to nothing
    if !mapped.fits_within(image_width, image_height) {
        return Err(CropError::InvalidRegion);
    }
    Ok(mapped)
}

/// Copy a pixel rectangle out of `image` into a new buffer.
///
/// # Errors
///
/// Returns `InvalidRegion` if `rect` is empty or not entirely inside the image,
/// and `MalformedSource` if the image's samples don't match its dimensions.
pub fn apply_crop(image: &PixelBuffer, rect: &ImageRect) -> Result<PixelBuffer, CropError> {
    if let Some((expected, actual)) = image.len_mismatch() {
        return Err(CropError::MalformedSource { expected, actual });
    }
    if !rect.fits_within(image.width, image.height) {
        return Err(CropError::InvalidRegion);
    }

    // Fast path: full crop returns a clone
    if rect.x == 0 && rect.y == 0 && rect.width == image.width && rect.height == image.height {
        return Ok(image.clone());
    }

    let channels = image.layout.channels();
    let src_stride = image.stride();
    let row_len = rect.width as usize * channels;
    let mut output = Vec::with_capacity(row_len * rect.height as usize);

    // Copy pixel data row by row
    for y in rect.y..rect.y + rect.height {
        let start = y as usize * src_stride + rect.x as usize * channels;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    Ok(PixelBuffer::new(rect.width, rect.height, image.layout, output))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
