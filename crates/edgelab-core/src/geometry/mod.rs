//! Display-space to image-space geometry.
//!
//! Pure math with no state beyond its inputs:
//! - [`crop`]: map a dragged rectangle onto image pixels and copy them out
//! - [`layout`]: fit-to-pane scaling, centering and overlay placement

pub mod crop;
pub mod layout;

pub use crop::{
    apply_crop, map_crop_to_image_space, CropError, DisplayRect, ImageRect, Viewport,
    MIN_CROP_EXTENT,
};
pub use layout::{
    center_layout, compute_fit_scale, fit_layout, ContainerGeometry, LayoutPlacement, Overlay,
};
