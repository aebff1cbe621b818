// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bimify Geometry
//!
//! Planar primitives used by the floor plan reconstruction: segments,
//! simple polygons, bounding boxes and angle helpers, built on nalgebra.

pub mod angle;
pub mod bounds;
pub mod error;
pub mod polygon;
pub mod segment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use angle::{angular_distance, direction_insensitive, is_parallel, wrap_angle};
pub use bounds::Bounds2D;
pub use error::{Error, Result};
pub use polygon::{Polygon, SegmentClip};
pub use segment::{cross, Segment, SegmentIntersection};
