//! Export encoding.
//!
//! Turns the session's current image into file bytes:
//! - [`ExportFormat`] picks PNG, JPEG or BMP from a file extension
//! - [`encode_snapshot`] upscales by the export scale, then encodes
//!
//! Writing the bytes to storage is left to the caller.

mod snapshot;

pub use snapshot::{encode_image, encode_snapshot, EncodeError, ExportFormat, ExportOptions};
