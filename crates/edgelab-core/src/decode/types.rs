//! Core pixel buffer types shared by every stage of the editor.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Empty input: no image data supplied")]
    EmptyInput,

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// None of the supplied members could be decoded.
    #[error("No decodable image among {0} candidate(s)")]
    NoDecodableImage(usize),

    /// Sample count does not match the declared dimensions.
    #[error("Malformed pixel buffer: expected {expected} bytes, got {actual}")]
    MalformedBuffer { expected: usize, actual: usize },
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Channel arrangement of a [`PixelBuffer`].
///
/// Alpha, when present, is always the last channel of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelLayout {
    /// One 8-bit intensity sample per pixel.
    Gray8,
    /// Red, green, blue.
    #[default]
    Rgb8,
    /// Red, green, blue, alpha.
    Rgba8,
}

impl PixelLayout {
    /// Samples per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Gray8 => 1,
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
        }
    }

    /// Samples per pixel that carry color (everything except alpha).
    #[inline]
    pub fn color_channels(self) -> usize {
        match self {
            PixelLayout::Rgba8 => 3,
            other => other.channels(),
        }
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelLayout::Rgba8)
    }

    /// Layout for a given number of channels, if supported.
    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(PixelLayout::Gray8),
            3 => Some(PixelLayout::Rgb8),
            4 => Some(PixelLayout::Rgba8),
            _ => None,
        }
    }

    pub(crate) fn color_type(self) -> image::ExtendedColorType {
        match self {
            PixelLayout::Gray8 => image::ExtendedColorType::L8,
            PixelLayout::Rgb8 => image::ExtendedColorType::Rgb8,
            PixelLayout::Rgba8 => image::ExtendedColorType::Rgba8,
        }
    }
}

/// A raster image held in memory.
///
/// Transforms never mutate a buffer in place; they allocate a new one so that
/// snapshots kept in the undo history stay valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channel arrangement of `pixels`.
    pub layout: PixelLayout,
    /// Samples in row-major order.
    /// Length should be width * height * layout.channels().
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, layout: PixelLayout, pixels: Vec<u8>) -> Self {
        let buffer = Self {
            width,
            height,
            layout,
            pixels,
        };
        debug_assert_eq!(
            buffer.expected_len(),
            Some(buffer.pixels.len()),
            "Pixel buffer size mismatch"
        );
        buffer
    }

    /// Create an RGB buffer. Shorthand used heavily by tests and bindings.
    pub fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self::new(width, height, PixelLayout::Rgb8, pixels)
    }

    /// Create a single-channel intensity buffer.
    pub fn gray(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self::new(width, height, PixelLayout::Gray8, pixels)
    }

    /// Number of bytes the declared dimensions require, or `None` if that
    /// doesn't fit in a `usize`.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.layout.channels())
    }

    /// `(expected, actual)` sample counts when they disagree.
    ///
    /// Dimensions too large to address report `expected` as `usize::MAX`.
    pub fn len_mismatch(&self) -> Option<(usize, usize)> {
        let actual = self.pixels.len();
        match self.expected_len() {
            Some(expected) if expected == actual => None,
            expected => Some((expected.unwrap_or(usize::MAX), actual)),
        }
    }

    /// Check that the sample count matches the declared dimensions.
    pub fn validate(&self) -> Result<(), DecodeError> {
        match self.len_mismatch() {
            Some((expected, actual)) => Err(DecodeError::MalformedBuffer { expected, actual }),
            None => Ok(()),
        }
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.layout.channels()
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Samples of the pixel at (x, y). Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.layout.channels();
        let start = y as usize * self.stride() + x as usize * channels;
        &self.pixels[start..start + channels]
    }

    /// Convert a decoded image, keeping the narrowest layout that loses nothing
    /// this editor cares about.
    pub fn from_dynamic_image(img: DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        let is_gray = !img.color().has_color();
        if has_alpha {
            Self::from_rgba_image(img.into_rgba8())
        } else if is_gray {
            let gray = img.into_luma8();
            let (width, height) = gray.dimensions();
            Self::new(width, height, PixelLayout::Gray8, gray.into_raw())
        } else {
            Self::from_rgb_image(img.into_rgb8())
        }
    }

    /// Create a PixelBuffer from an image::RgbImage.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelLayout::Rgb8, img.into_raw())
    }

    /// Create a PixelBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelLayout::Rgba8, img.into_raw())
    }

    /// Convert to an image::DynamicImage for resampling or encoding.
    ///
    /// Returns `None` when the sample count does not match the dimensions.
    pub fn to_dynamic_image(&self) -> Option<DynamicImage> {
        let pixels = self.pixels.clone();
        match self.layout {
            PixelLayout::Gray8 => {
                GrayImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageLuma8)
            }
            PixelLayout::Rgb8 => {
                RgbImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageRgb8)
            }
            PixelLayout::Rgba8 => {
                RgbaImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageRgba8)
            }
        }
    }
}
