//! Intensity extraction using ITU-R BT.709 coefficients.
//!
//! Edge filters work on a single intensity channel. Grayscale samples are used
//! as-is; color pixels are reduced to their perceptual luminance.

use crate::decode::{PixelBuffer, PixelLayout};

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f32 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f32 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f32 = 0.0722;

/// Calculate luminance from u8 RGB values (0 to 255).
#[inline]
pub fn calculate_luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    let lum = LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32;
    lum.clamp(0.0, 255.0).round() as u8
}

/// Intensity of one pixel's samples.
#[inline]
pub fn pixel_intensity(samples: &[u8], layout: PixelLayout) -> u8 {
    match layout {
        PixelLayout::Gray8 => samples[0],
        PixelLayout::Rgb8 | PixelLayout::Rgba8 => {
            calculate_luminance_u8(samples[0], samples[1], samples[2])
        }
    }
}

/// Reduce a whole buffer to one intensity sample per pixel, row-major.
///
/// The caller is responsible for validating the buffer first.
pub fn intensity_plane(buffer: &PixelBuffer) -> Vec<u8> {
    match buffer.layout {
        PixelLayout::Gray8 => buffer.pixels.clone(),
        layout => buffer
            .pixels
            .chunks_exact(layout.channels())
            .map(|px| pixel_intensity(px, layout))
            .collect(),
    }
}
