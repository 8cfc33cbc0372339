//! EdgeLab Core - edge-detection image editing engine
//!
//! This crate provides the editing core behind EdgeLab: decoding, crop
//! geometry, Roberts/Sobel/Laplacian edge filters with cancellable background
//! jobs, linear undo, view layout and snapshot export. UI and storage live
//! outside; everything here is driven through plain data.
//!
//! The usual entry point is [`EditSession`].

pub mod config;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod luminance;
pub mod session;

pub use config::SessionConfig;
pub use decode::{decode_image, DecodeError, PixelBuffer, PixelLayout};
pub use encode::{encode_snapshot, EncodeError, ExportFormat, ExportOptions};
pub use filter::{apply_edge_filter, EdgeAlgorithm, FilterError, JobHandle, JobOutcome, JobState};
pub use geometry::{
    apply_crop, center_layout, compute_fit_scale, map_crop_to_image_space, ContainerGeometry,
    CropError, DisplayRect, ImageRect, LayoutPlacement, Overlay, Viewport,
};
pub use history::HistoryStack;
pub use session::{EditSession, SessionError};
