//! Crop mapping and layout WASM bindings.
//!
//! Structured results (`ImageRect`, `LayoutPlacement`) are returned as plain
//! JavaScript objects via serde.

use crate::types::{to_js_error, JsPixelBuffer};
use edgelab_core::geometry::{self, ContainerGeometry, DisplayRect, ImageRect, Viewport};
use wasm_bindgen::prelude::*;

/// Map a rectangle dragged in display space onto image pixels.
///
/// # Returns
///
/// `{ x, y, width, height }` in image pixels.
///
/// # Errors
///
/// Returns an error if the drag is under 5 display units on either axis, the
/// view has no area, or the region falls outside the image.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn map_crop(
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    view_width: f64,
    view_height: f64,
    offset_x: f64,
    offset_y: f64,
    image_width: u32,
    image_height: u32,
) -> Result<JsValue, JsValue> {
    let rect = DisplayRect::new(start_x, start_y, end_x, end_y);
    let viewport = Viewport::new(view_width, view_height, offset_x, offset_y);
    let mapped = geometry::map_crop_to_image_space(&rect, &viewport, image_width, image_height)
        .map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&mapped).map_err(to_js_error)
}

/// Copy an image-space rectangle out of an image.
#[wasm_bindgen]
pub fn crop_image(
    image: &JsPixelBuffer,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<JsPixelBuffer, JsValue> {
    let buffer = image.to_buffer()?;
    geometry::apply_crop(&buffer, &ImageRect::new(x, y, width, height))
        .map(JsPixelBuffer::from_buffer)
        .map_err(to_js_error)
}

/// Largest uniform scale that fits content inside a container.
#[wasm_bindgen]
pub fn compute_fit_scale(
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> f64 {
    geometry::compute_fit_scale(container_width, container_height, content_width, content_height)
}

/// Center content scaled by `scale` inside a container.
///
/// # Returns
///
/// `{ x, y, width, height, scale }` in display units.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn center_layout(
    scale: f64,
    container_x: f64,
    container_y: f64,
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> Result<JsValue, JsValue> {
    let container = ContainerGeometry {
        x: container_x,
        y: container_y,
        width: container_width,
        height: container_height,
    };
    let placement = geometry::center_layout(scale, &container, content_width, content_height);
    serde_wasm_bindgen::to_value(&placement).map_err(to_js_error)
}
