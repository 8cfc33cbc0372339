//! Snapshot export WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_snapshot } from '@edgelab/wasm';
//!
//! // 5x upscale, format from the save dialog's extension
//! const bytes = encode_snapshot(image, "png", 5.0, 90);
//! const blob = new Blob([bytes], { type: "image/png" });
//! ```

use crate::types::{to_js_error, JsPixelBuffer};
use edgelab_core::encode::{self, ExportFormat, ExportOptions};
use wasm_bindgen::prelude::*;

/// Upscale an image and encode it in the format named by `extension`.
///
/// # Arguments
///
/// * `image` - Image to export
/// * `extension` - `"png"`, `"jpg"`/`"jpeg"` or `"bmp"`, with or without a dot
/// * `scale` - Upscale factor (the editor exports at 5.0)
/// * `quality` - JPEG quality (1-100); ignored by PNG and BMP
///
/// # Errors
///
/// Returns an error for unknown extensions, malformed images, and scales
/// that are non-positive or would produce an oversized output.
#[wasm_bindgen]
pub fn encode_snapshot(
    image: &JsPixelBuffer,
    extension: &str,
    scale: f64,
    quality: u8,
) -> Result<Vec<u8>, JsValue> {
    let format = ExportFormat::from_extension(extension).map_err(to_js_error)?;
    let options = ExportOptions {
        format,
        scale,
        quality,
        ..ExportOptions::default()
    };
    let buffer = image.to_buffer()?;
    encode::encode_snapshot(&buffer, &options).map_err(to_js_error)
}

/// MIME type for an export extension, for building a `Blob`.
#[wasm_bindgen]
pub fn export_mime_type(extension: &str) -> Result<String, JsValue> {
    ExportFormat::from_extension(extension)
        .map(|format| format.mime_type().to_string())
        .map_err(to_js_error)
}
