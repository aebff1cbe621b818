// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for plan topology operations.

use crate::keys::*;

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
///
/// Only [`Error::DegenerateWall`] comes from the geometry of the input; the
/// `*NotFound` variants mean a caller passed a stale or foreign key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A wall centerline starts and ends at the same point.
    #[error("wall line cannot have identical endpoints ({x}, {y})")]
    DegenerateWall { x: f64, y: f64 },

    /// Node key not found in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Wall key not found in the arena.
    #[error("wall not found: {0:?}")]
    WallNotFound(WallKey),

    /// Room key not found in the arena.
    #[error("room not found: {0:?}")]
    RoomNotFound(RoomKey),

    /// Opening key not found in the arena.
    #[error("opening not found: {0:?}")]
    OpeningNotFound(OpeningKey),

    /// Object key not found in the arena.
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectKey),

    /// Outlet key not found in the arena.
    #[error("outlet not found: {0:?}")]
    OutletNotFound(OutletKey),

    /// Housing key not found in the arena.
    #[error("housing not found: {0:?}")]
    HousingNotFound(HousingKey),

    /// A room side index past the end of the room's side list.
    #[error("room {room:?} has no side {index}")]
    SideNotFound { room: RoomKey, index: usize },

    /// Polygon or segment construction failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] bimify_geometry::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
