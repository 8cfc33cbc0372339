//! Session settings the host can persist between runs.

use serde::{Deserialize, Serialize};

use crate::encode::ExportOptions;
use crate::filter::NEUTRAL_STRENGTH;
use crate::geometry::ContainerGeometry;

/// Settings for one [`EditSession`](crate::session::EditSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pane the image is fitted into.
    pub container: ContainerGeometry,
    /// Strength used when the caller doesn't pick one.
    pub default_strength: i32,
    /// How snapshots are exported.
    pub export: ExportOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            container: ContainerGeometry::default(),
            default_strength: NEUTRAL_STRENGTH,
            export: ExportOptions::default(),
        }
    }
}
