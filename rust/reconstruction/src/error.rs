// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the reconstruction pipeline.

pub type Result<T> = std::result::Result<T, ReconstructionError>;

/// Errors that abort a reconstruction run.
///
/// Detections that resolve to nothing (an opening with no wall nearby, an
/// object without a hit) are logged and skipped, not reported here.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructionError {
    #[error("topology error: {0}")]
    Topology(#[from] bimify_topology::Error),

    #[error("geometry error: {0}")]
    Geometry(#[from] bimify_geometry::Error),

    /// A class-tagged detection lacks a field its class requires.
    #[error("detection {index} is invalid: {reason}")]
    InvalidDetection { index: usize, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
