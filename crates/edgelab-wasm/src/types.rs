//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core EdgeLab
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use edgelab_core::decode::{PixelBuffer, PixelLayout};
use wasm_bindgen::prelude::*;

/// An image wrapper for JavaScript.
///
/// Holds interleaved 8-bit samples with 1 (gray), 3 (RGB) or 4 (RGBA)
/// channels per pixel.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`. Keep images in WASM memory between
/// filter calls and only extract pixels for display.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Create a new JsPixelBuffer from dimensions and interleaved samples.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `channels` - Samples per pixel (1, 3 or 4)
    /// * `pixels` - Samples in row-major order
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> JsPixelBuffer {
        JsPixelBuffer {
            width,
            height,
            channels,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel.
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Get the number of bytes in the pixel buffer
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns the samples as a Uint8Array copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Samples expanded to RGBA, ready for `ImageData`.
    pub fn to_rgba(&self) -> Vec<u8> {
        match self.channels {
            1 => self.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            3 => self
                .pixels
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            _ => self.pixels.clone(),
        }
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPixelBuffer {
    /// Wrap a core buffer.
    pub(crate) fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            channels: buffer.layout.channels() as u8,
            pixels: buffer.pixels,
        }
    }

    /// Core layout for the declared channel count, if supported.
    pub(crate) fn layout(&self) -> Option<PixelLayout> {
        PixelLayout::from_channels(self.channels as usize)
    }

    /// Convert back to a core buffer. Clones the pixel data.
    ///
    /// Sample count is not checked here; core functions validate it.
    pub(crate) fn to_buffer(&self) -> Result<PixelBuffer, JsValue> {
        let layout = self.layout().ok_or_else(|| {
            JsValue::from_str(&format!("Unsupported channel count: {}", self.channels))
        })?;
        Ok(PixelBuffer {
            width: self.width,
            height: self.height,
            layout,
            pixels: self.pixels.clone(),
        })
    }
}

/// Render any displayable error as a JavaScript string.
pub(crate) fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
