// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Bimify Topology
//!
//! Building topology reconstructed from floor-plan detections.
//!
//! All entities (nodes, walls, rooms, openings, objects, outlets, housings)
//! live in a [`PlanArena`] and reference each other by generational keys.
//! Operations are inherent methods on the arena, grouped by concern:
//!
//! - [`graph`]: walls joined at nodes, subwalls, extensions
//! - [`junction`]: building the graph from loose wall segments
//! - [`room`] and [`side`]: room boundaries and side occupancy
//! - [`opening`]: doors and windows and the rooms they connect
//! - [`object`] and [`anchoring`]: furniture placement against walls
//! - [`classification`]: room categories
//! - [`housing`]: dwelling units
//!
//! Every entity also carries a numeric identifier from the arena's
//! [`IdRegistry`]; [`serialization`] exports the plan with those.

pub mod anchoring;
pub mod arena;
pub mod classification;
pub mod error;
pub mod graph;
pub mod housing;
pub mod junction;
pub mod keys;
pub mod object;
pub mod opening;
pub mod outlet;
pub mod registry;
pub mod room;
pub mod serialization;
pub mod side;
pub mod spatial;

pub use anchoring::{AnchorConfig, AnchorOutcome};
pub use arena::PlanArena;
pub use classification::RoomCategory;
pub use error::{Error, Result};
pub use graph::{NodeData, WallConnection, WallData, WallEnd, CONNECTION_TOLERANCE};
pub use housing::HousingData;
pub use junction::JunctionConfig;
pub use keys::{
    ElementKey, EntityKind, HousingKey, NodeKey, ObjectKey, OpeningKey, OutletKey, RoomKey,
    WallKey,
};
pub use object::{BedSize, ObjectCatalog, ObjectData, ObjectKind, WallSide, DOUBLE_BED, SINGLE_BED};
pub use opening::{OpeningConfig, OpeningData, OpeningKind};
pub use outlet::{OutletData, OutletKind};
pub use registry::IdRegistry;
pub use room::RoomData;
pub use serialization::PlanSnapshot;
pub use side::{Occupancy, RoomSide, SideConfig};
pub use spatial::{NodeIndex, WallIndex};
