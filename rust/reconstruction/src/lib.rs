// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan reconstruction
//!
//! Turns the raw detections of a floor plan (walls, rooms, doors, windows,
//! furniture, outlets) into a labeled building topology:
//! 1. Walls are joined into a graph at shared junction nodes
//! 2. Openings are hosted on walls and linked to the rooms they connect
//! 3. Objects are placed in rooms and anchored against walls
//! 4. Rooms are split into sides, classified and grouped into housings
//!
//! # Usage
//!
//! ```rust,ignore
//! use bimify_reconstruction::{reconstruct, DetectedPlan, ReconstructionConfig};
//!
//! let plan = DetectedPlan::from_json(&detections_json)?;
//! let result = reconstruct(&plan, &ReconstructionConfig::from_env())?;
//! println!("{}", result.arena.to_json()?);
//! ```

pub mod config;
pub mod error;
pub mod housing;
pub mod pipeline;
pub mod types;

pub use config::ReconstructionConfig;
pub use error::{ReconstructionError, Result};
pub use housing::group_housings;
pub use pipeline::{reconstruct, Reconstruction, ReconstructionSummary};
pub use types::{
    DetectedObject, DetectedOpening, DetectedOutlet, DetectedPlan, DetectedRoom, DetectedWall,
    Detection, DetectionClass, Point2D,
};
