//! Image decoding WASM bindings.
//!
//! - [`decode_image`] - Decode PNG, JPEG or BMP bytes
//! - [`scale_image`] - Resample an image by a uniform factor
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@edgelab/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}, ${image.channels} channels`);
//! ```

use crate::types::{to_js_error, JsPixelBuffer};
use edgelab_core::decode::{self, FilterType};
use wasm_bindgen::prelude::*;

/// Decode an image from bytes.
///
/// The format is sniffed from the content. EXIF orientation is applied so
/// the image comes out upright.
///
/// # Errors
///
/// Returns an error if the bytes are empty, not a supported format, or
/// corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsPixelBuffer, JsValue> {
    decode::decode_image(bytes)
        .map(JsPixelBuffer::from_buffer)
        .map_err(to_js_error)
}

/// Resample an image by `factor`, keeping at least one pixel per side.
///
/// `filter`: 0 = Nearest, 2 = Lanczos3, anything else = Bilinear.
#[wasm_bindgen]
pub fn scale_image(
    image: &JsPixelBuffer,
    factor: f64,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    let buffer = image.to_buffer()?;
    decode::scale_by(&buffer, factor, filter_from_u8(filter))
        .map(JsPixelBuffer::from_buffer)
        .map_err(to_js_error)
}

/// Convert a u8 filter type value to the core FilterType enum.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}
