//! Image decoding for the editor.
//!
//! This module provides functionality for:
//! - Decoding PNG, JPEG and BMP bytes into a [`PixelBuffer`]
//! - Picking the first readable image out of a list of candidates
//! - Resampling buffers (used when exporting at a higher resolution)
//!
//! All operations are synchronous and allocate new buffers.

mod reader;
mod resize;
mod types;

pub use reader::{decode_first, decode_image};
pub use resize::{resize, scale_by, scaled_dimensions, MAX_RESAMPLE_PIXELS};
pub use types::{DecodeError, FilterType, Orientation, PixelBuffer, PixelLayout};
