//! Edge filter WASM bindings.
//!
//! Filters run synchronously on the calling thread. In the browser, call
//! them from a Web Worker to keep the page responsive.

use crate::types::{to_js_error, JsPixelBuffer};
use edgelab_core::filter::{self, EdgeAlgorithm};
use wasm_bindgen::prelude::*;

/// Run an edge filter over an image.
///
/// # Arguments
///
/// * `image` - Source image (left untouched)
/// * `algorithm` - `"roberts"`, `"sobel"` or `"laplacian"` (case-insensitive)
/// * `strength` - 50 writes the raw edge magnitude; higher brightens, lower dims
///
/// # Example (TypeScript)
///
/// ```typescript
/// const edges = apply_edge_filter(image, "sobel", 50);
/// ```
#[wasm_bindgen]
pub fn apply_edge_filter(
    image: &JsPixelBuffer,
    algorithm: &str,
    strength: i32,
) -> Result<JsPixelBuffer, JsValue> {
    let algorithm: EdgeAlgorithm = algorithm.parse().map_err(to_js_error)?;
    let buffer = image.to_buffer()?;
    filter::apply_edge_filter(&buffer, algorithm, strength)
        .map(JsPixelBuffer::from_buffer)
        .map_err(to_js_error)
}

/// Names accepted by [`apply_edge_filter`], for populating a menu.
#[wasm_bindgen]
pub fn edge_algorithms() -> Vec<String> {
    EdgeAlgorithm::ALL
        .iter()
        .map(|algorithm| algorithm.name().to_string())
        .collect()
}
