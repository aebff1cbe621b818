// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for plan entities.
//!
//! The [`PlanArena`] is the central owner of all reconstruction data. Every
//! entity (node, wall, room, opening, object, outlet, housing) lives inside a
//! slot map with stable, generational keys. Relationships between entities
//! (wall ↔ node, room ↔ opening ↔ room, room ↔ housing) are stored as keys on
//! both sides, so removing an entity never leaves a dangling pointer; stale
//! keys simply stop resolving.
//!
//! The arena also owns the [`IdRegistry`] that hands out the numeric
//! identifiers exporters see. One arena lives for one reconstruction run.

use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graph::{NodeData, WallData};
use crate::housing::HousingData;
use crate::keys::*;
use crate::object::ObjectData;
use crate::opening::OpeningData;
use crate::outlet::OutletData;
use crate::registry::IdRegistry;
use crate::room::RoomData;

/// The central arena that owns all plan entities and the identifier registry.
///
/// # Example
///
/// ```
/// use bimify_geometry::{Point2, Segment};
/// use bimify_topology::PlanArena;
///
/// let mut arena = PlanArena::new();
/// let wall = arena
///     .add_wall(Segment::from_coords(0.0, 0.0, 100.0, 0.0), 10.0, None, None)
///     .unwrap();
/// let node = arena.add_node(Point2::new(0.0, 0.0), None);
/// arena.connect_wall_to_node(wall, node, 0.0).unwrap();
///
/// assert!(arena.wall(wall).unwrap().is_start_connected());
/// ```
#[derive(Debug, Default)]
pub struct PlanArena {
    pub(crate) nodes: SlotMap<NodeKey, NodeData>,
    pub(crate) walls: SlotMap<WallKey, WallData>,
    pub(crate) rooms: SlotMap<RoomKey, RoomData>,
    pub(crate) openings: SlotMap<OpeningKey, OpeningData>,
    pub(crate) objects: SlotMap<ObjectKey, ObjectData>,
    pub(crate) outlets: SlotMap<OutletKey, OutletData>,
    pub(crate) housings: SlotMap<HousingKey, HousingData>,

    pub(crate) registry: IdRegistry,
}

impl PlanArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier counters of this run.
    pub fn registry(&self) -> &IdRegistry {
        &self.registry
    }

    // --- Nodes ---

    pub fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &NodeData)> {
        self.nodes.iter()
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut NodeData> {
        self.nodes.get_mut(key).ok_or(Error::NodeNotFound(key))
    }

    // --- Walls ---

    pub fn wall(&self, key: WallKey) -> Option<&WallData> {
        self.walls.get(key)
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn walls(&self) -> impl Iterator<Item = (WallKey, &WallData)> {
        self.walls.iter()
    }

    pub(crate) fn wall_ref(&self, key: WallKey) -> Result<&WallData> {
        self.walls.get(key).ok_or(Error::WallNotFound(key))
    }

    pub(crate) fn wall_mut(&mut self, key: WallKey) -> Result<&mut WallData> {
        self.walls.get_mut(key).ok_or(Error::WallNotFound(key))
    }

    // --- Rooms ---

    pub fn room(&self, key: RoomKey) -> Option<&RoomData> {
        self.rooms.get(key)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms(&self) -> impl Iterator<Item = (RoomKey, &RoomData)> {
        self.rooms.iter()
    }

    /// Room keys in storage order, the order every "first room wins" rule uses.
    pub fn room_keys(&self) -> Vec<RoomKey> {
        self.rooms.keys().collect()
    }

    pub(crate) fn room_ref(&self, key: RoomKey) -> Result<&RoomData> {
        self.rooms.get(key).ok_or(Error::RoomNotFound(key))
    }

    pub(crate) fn room_mut(&mut self, key: RoomKey) -> Result<&mut RoomData> {
        self.rooms.get_mut(key).ok_or(Error::RoomNotFound(key))
    }

    // --- Openings ---

    pub fn opening(&self, key: OpeningKey) -> Option<&OpeningData> {
        self.openings.get(key)
    }

    pub fn opening_count(&self) -> usize {
        self.openings.len()
    }

    pub fn openings(&self) -> impl Iterator<Item = (OpeningKey, &OpeningData)> {
        self.openings.iter()
    }

    pub(crate) fn opening_ref(&self, key: OpeningKey) -> Result<&OpeningData> {
        self.openings.get(key).ok_or(Error::OpeningNotFound(key))
    }

    pub(crate) fn opening_mut(&mut self, key: OpeningKey) -> Result<&mut OpeningData> {
        self.openings.get_mut(key).ok_or(Error::OpeningNotFound(key))
    }

    // --- Objects ---

    pub fn object(&self, key: ObjectKey) -> Option<&ObjectData> {
        self.objects.get(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &ObjectData)> {
        self.objects.iter()
    }

    pub(crate) fn object_ref(&self, key: ObjectKey) -> Result<&ObjectData> {
        self.objects.get(key).ok_or(Error::ObjectNotFound(key))
    }

    pub(crate) fn object_mut(&mut self, key: ObjectKey) -> Result<&mut ObjectData> {
        self.objects.get_mut(key).ok_or(Error::ObjectNotFound(key))
    }

    // --- Outlets ---

    pub fn outlet(&self, key: OutletKey) -> Option<&OutletData> {
        self.outlets.get(key)
    }

    pub fn outlet_count(&self) -> usize {
        self.outlets.len()
    }

    pub fn outlets(&self) -> impl Iterator<Item = (OutletKey, &OutletData)> {
        self.outlets.iter()
    }

    // --- Housings ---

    pub fn housing(&self, key: HousingKey) -> Option<&HousingData> {
        self.housings.get(key)
    }

    pub fn housing_count(&self) -> usize {
        self.housings.len()
    }

    pub fn housings(&self) -> impl Iterator<Item = (HousingKey, &HousingData)> {
        self.housings.iter()
    }

    pub(crate) fn housing_mut(&mut self, key: HousingKey) -> Result<&mut HousingData> {
        self.housings.get_mut(key).ok_or(Error::HousingNotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_arena() {
        let arena = PlanArena::new();
        assert_eq!(arena.node_count(), 0);
        assert_eq!(arena.wall_count(), 0);
        assert_eq!(arena.room_count(), 0);
        assert_eq!(arena.opening_count(), 0);
        assert_eq!(arena.object_count(), 0);
        assert_eq!(arena.outlet_count(), 0);
        assert_eq!(arena.housing_count(), 0);
        assert_eq!(arena.registry().peek(EntityKind::Wall), 0);
    }
}
