//! EdgeLab WASM - WebAssembly bindings for EdgeLab
//!
//! This crate provides WASM bindings to expose the edgelab-core functionality
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding and resampling
//! - `edges` - Roberts, Sobel and Laplacian edge filters
//! - `geometry` - Crop mapping, fit scale and centering
//! - `encode` - Snapshot export (PNG, JPEG, BMP)
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, apply_edge_filter } from '@edgelab/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const edges = apply_edge_filter(image, "sobel", 50);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod edges;
mod encode;
mod geometry;
mod types;

// Re-export public types
pub use decode::{decode_image, scale_image};
pub use edges::{apply_edge_filter, edge_algorithms};
pub use encode::{encode_snapshot, export_mime_type};
pub use geometry::{center_layout, compute_fit_scale, crop_image, map_crop};
pub use types::JsPixelBuffer;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
