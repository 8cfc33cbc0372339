//! Scale-to-fit and centering math for placing an image inside its pane.
//!
//! The view pane has a fixed origin and size. Zooming multiplies the pane's
//! target size by a factor; the image is scaled uniformly to fit that target
//! and then centered against the pane's original size, so zooming in grows the
//! image outward from the pane's center.

use serde::{Deserialize, Serialize};

use super::Viewport;

/// The pane the image is drawn into, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContainerGeometry {
    fn default() -> Self {
        Self {
            x: 150.0,
            y: 60.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Where the scaled image ends up, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlacement {
    /// Left edge of the drawn image.
    pub x: f64,
    /// Top edge of the drawn image.
    pub y: f64,
    /// Drawn width.
    pub width: f64,
    /// Drawn height.
    pub height: f64,
    /// Uniform image-to-display scale that produced `width` and `height`.
    pub scale: f64,
}

impl LayoutPlacement {
    /// The viewport a crop drag over this placement should be mapped through.
    pub fn to_viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.x, self.y)
    }

    /// Map an overlay anchored in image pixels into display space.
    ///
    /// Position and font size grow with the same uniform scale as the image,
    /// so a watermark keeps its place and proportion when the view is resized.
    pub fn place_overlay(&self, overlay: &Overlay) -> Overlay {
        Overlay {
            x: self.x + overlay.x * self.scale,
            y: self.y + overlay.y * self.scale,
            font_size: overlay.font_size * self.scale,
        }
    }
}

/// A text overlay (watermark) anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Overlay {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Largest uniform scale that fits the content inside the container without
/// distortion.
///
/// Content without area yields `0.0`.
pub fn compute_fit_scale(
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> f64 {
    if content_width <= 0.0 || content_height <= 0.0 {
        return 0.0;
    }
    let ratio_w = container_width / content_width;
    let ratio_h = container_height / content_height;
    ratio_w.min(ratio_h)
}

/// Center content scaled by `scale` inside the container.
pub fn center_layout(
    scale: f64,
    container: &ContainerGeometry,
    content_width: f64,
    content_height: f64,
) -> LayoutPlacement {
    let width = content_width * scale;
    let height = content_height * scale;
    LayoutPlacement {
        x: container.x + (container.width - width) / 2.0,
        y: container.y + (container.height - height) / 2.0,
        width,
        height,
        scale,
    }
}

/// Fit content into the container zoomed by `factor` and center it.
///
/// A factor of `1.0` is the initial placement after loading an image.
pub fn fit_layout(
    factor: f64,
    container: &ContainerGeometry,
    content_width: u32,
    content_height: u32,
) -> LayoutPlacement {
    let content_w = content_width as f64;
    let content_h = content_height as f64;
    let scale = compute_fit_scale(
        container.width * factor,
        container.height * factor,
        content_w,
        content_h,
    );
    center_layout(scale, container, content_w, content_h)
}
