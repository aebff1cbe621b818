// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building 2D primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Polygon must have at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Segment has zero length at ({x}, {y})")]
    DegenerateSegment { x: f64, y: f64 },
}
