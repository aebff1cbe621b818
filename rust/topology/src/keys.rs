// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity key types for arena-based storage.
//!
//! Each plan entity gets a unique, type-safe key for O(1) lookup in the
//! arena. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other entities are removed (generational indices). Keys are internal
//! handles; the numeric identifiers handed to exporters come from the
//! [`IdRegistry`](crate::registry::IdRegistry).

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for a node (junction point shared by walls).
    pub struct NodeKey;

    /// Key for a wall (centerline with thickness and footprint).
    pub struct WallKey;

    /// Key for a room (closed boundary polygon).
    pub struct RoomKey;

    /// Key for an opening (door or window hosted in a wall).
    pub struct OpeningKey;

    /// Key for a movable object (furniture or sanitary fixture).
    pub struct ObjectKey;

    /// Key for an outlet (power or data socket).
    pub struct OutletKey;

    /// Key for a housing (dwelling unit grouping rooms).
    pub struct HousingKey;
}

/// An element that can occupy a stretch of a room side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Object(ObjectKey),
    Opening(OpeningKey),
    Outlet(OutletKey),
}

impl From<ObjectKey> for ElementKey {
    fn from(k: ObjectKey) -> Self {
        ElementKey::Object(k)
    }
}

impl From<OpeningKey> for ElementKey {
    fn from(k: OpeningKey) -> Self {
        ElementKey::Opening(k)
    }
}

impl From<OutletKey> for ElementKey {
    fn from(k: OutletKey) -> Self {
        ElementKey::Outlet(k)
    }
}

/// Discriminant for entity kinds, one identifier counter each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Node = 0,
    Wall = 1,
    Room = 2,
    Opening = 3,
    Object = 4,
    Outlet = 5,
    Housing = 6,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Node,
        EntityKind::Wall,
        EntityKind::Room,
        EntityKind::Opening,
        EntityKind::Object,
        EntityKind::Outlet,
        EntityKind::Housing,
    ];

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "Node",
            EntityKind::Wall => "Wall",
            EntityKind::Room => "Room",
            EntityKind::Opening => "Opening",
            EntityKind::Object => "Object",
            EntityKind::Outlet => "Outlet",
            EntityKind::Housing => "Housing",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn entity_kind_names() {
        assert_eq!(EntityKind::Node.as_str(), "Node");
        assert_eq!(EntityKind::Housing.to_string(), "Housing");
        assert_eq!(EntityKind::ALL.len(), 7);
    }

    #[test]
    fn element_key_conversions() {
        let mut objects: SlotMap<ObjectKey, ()> = SlotMap::with_key();
        let k = objects.insert(());
        assert_eq!(ElementKey::from(k), ElementKey::Object(k));
    }
}
