//! Snapshot export: upscale the current image and encode it to a file format.
//!
//! Exports are rasterized above on-screen resolution (5× by default) so the
//! saved file holds more detail than the view pane shows.

use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{scale_by, scaled_dimensions, FilterType, PixelBuffer, PixelLayout};

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Export scale is not positive and finite, or the output is too large
    #[error("Invalid export scale: {0}")]
    InvalidScale(f64),

    /// File extension doesn't name a supported format
    #[error("Unsupported export format: {0:?}")]
    UnsupportedFormat(String),

    /// Encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    /// Resolve a format from a file extension, with or without the leading
    /// dot. Matching ignores case; `jpg` and `jpeg` are the same format.
    pub fn from_extension(extension: &str) -> Result<Self, EncodeError> {
        let trimmed = extension.trim().trim_start_matches('.');
        match trimmed.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            _ => Err(EncodeError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Resolve a format from the extension of a file name.
    pub fn from_file_name(name: &str) -> Result<Self, EncodeError> {
        match name.rsplit_once('.') {
            Some((_, extension)) => Self::from_extension(extension),
            None => Err(EncodeError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Canonical extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
        }
    }
}

/// How a snapshot is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Upscale factor applied before encoding.
    pub scale: f64,
    /// JPEG quality (1-100). Ignored by lossless formats.
    pub quality: u8,
    /// Resampling filter used for the upscale.
    pub filter: FilterType,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            scale: 5.0,
            quality: 90,
            filter: FilterType::Lanczos3,
        }
    }
}

impl ExportOptions {
    /// Same options with a different format.
    pub fn with_format(self, format: ExportFormat) -> Self {
        Self { format, ..self }
    }
}

/// Upscale `buffer` by `options.scale` and encode it.
///
/// # Errors
///
/// Rejects empty or malformed buffers before any work is done, and
/// `InvalidScale` for a non-positive scale or one whose output would exceed
/// [`MAX_RESAMPLE_PIXELS`](crate::decode::MAX_RESAMPLE_PIXELS).
pub fn encode_snapshot(
    buffer: &PixelBuffer,
    options: &ExportOptions,
) -> Result<Vec<u8>, EncodeError> {
    check_buffer(buffer)?;
    if scaled_dimensions(buffer.width, buffer.height, options.scale).is_none() {
        return Err(EncodeError::InvalidScale(options.scale));
    }

    let bytes = if options.scale == 1.0 {
        encode_image(buffer, options.format, options.quality)?
    } else {
        let scaled = scale_by(buffer, options.scale, options.filter)
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        encode_image(&scaled, options.format, options.quality)?
    };

    log::debug!(
        "exported {}x{} at {}x as {} ({} bytes)",
        buffer.width,
        buffer.height,
        options.scale,
        options.format.extension(),
        bytes.len()
    );
    Ok(bytes)
}

/// Encode `buffer` as-is in `format`.
///
/// JPEG has no alpha channel, so RGBA input is flattened to RGB by dropping
/// alpha. `quality` is clamped to 1-100.
pub fn encode_image(
    buffer: &PixelBuffer,
    format: ExportFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    check_buffer(buffer)?;

    let mut output = Cursor::new(Vec::new());
    let (width, height) = (buffer.width, buffer.height);

    let written = match format {
        ExportFormat::Png => PngEncoder::new(&mut output).write_image(
            &buffer.pixels,
            width,
            height,
            buffer.layout.color_type(),
        ),
        ExportFormat::Jpeg => {
            let quality = quality.clamp(1, 100);
            let encoder = JpegEncoder::new_with_quality(&mut output, quality);
            if buffer.layout.has_alpha() {
                let rgb = drop_alpha(&buffer.pixels);
                encoder.write_image(&rgb, width, height, PixelLayout::Rgb8.color_type())
            } else {
                encoder.write_image(&buffer.pixels, width, height, buffer.layout.color_type())
            }
        }
        ExportFormat::Bmp => BmpEncoder::new(&mut output).write_image(
            &buffer.pixels,
            width,
            height,
            buffer.layout.color_type(),
        ),
    };
    written.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(output.into_inner())
}

fn check_buffer(buffer: &PixelBuffer) -> Result<(), EncodeError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: buffer.width,
            height: buffer.height,
        });
    }
    match buffer.len_mismatch() {
        Some((expected, actual)) => Err(EncodeError::InvalidPixelData { expected, actual }),
        None => Ok(()),
    }
}

fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
