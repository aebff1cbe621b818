// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rooms: closed boundary polygons with their contents and neighbours.

use bimify_geometry::{is_parallel, Point2, Polygon};

use crate::arena::PlanArena;
use crate::classification::RoomCategory;
use crate::error::Result;
use crate::keys::*;
use crate::side::RoomSide;

/// Data stored for a room.
#[derive(Debug, Clone)]
pub struct RoomData {
    pub id: u32,
    pub polygon: Polygon,
    pub name: String,
    pub category: RoomCategory,
    pub objects: Vec<ObjectKey>,
    pub doors: Vec<OpeningKey>,
    pub windows: Vec<OpeningKey>,
    /// Rooms reachable through a shared opening
    pub adjacent: Vec<RoomKey>,
    /// One side per boundary edge, filled by linearization
    pub sides: Vec<RoomSide>,
    pub surrounding_walls: Vec<WallKey>,
    pub outlets: Vec<OutletKey>,
    pub housing: Option<HousingKey>,
}

impl RoomData {
    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    pub fn corners(&self) -> &[Point2<f64>] {
        self.polygon.vertices()
    }

    /// Boundary as rounded integer coordinates, closing vertex included.
    pub fn rounded_boundary(&self) -> Vec<(i64, i64)> {
        let v = self.polygon.vertices();
        v.iter()
            .chain(v.first())
            .map(|p| (p.x.round() as i64, p.y.round() as i64))
            .collect()
    }
}

impl PlanArena {
    /// Adds a room with an undefined category.
    pub fn add_room(&mut self, polygon: Polygon, id: Option<u32>) -> RoomKey {
        let id = self.registry.issue(EntityKind::Room, id);
        self.rooms.insert(RoomData {
            id,
            polygon,
            name: RoomCategory::Undefined.label().to_string(),
            category: RoomCategory::Undefined,
            objects: Vec::new(),
            doors: Vec::new(),
            windows: Vec::new(),
            adjacent: Vec::new(),
            sides: Vec::new(),
            surrounding_walls: Vec::new(),
            outlets: Vec::new(),
            housing: None,
        })
    }

    /// The first room, in storage order, whose polygon strictly contains
    /// `point`.
    pub fn room_containing(&self, point: &Point2<f64>) -> Option<RoomKey> {
        self.rooms
            .iter()
            .find(|(_, r)| r.polygon.contains(point))
            .map(|(k, _)| k)
    }

    /// Records that two rooms share an opening. Symmetric and free of
    /// duplicates; a room is never adjacent to itself.
    pub fn connect_rooms(&mut self, a: RoomKey, b: RoomKey) -> Result<()> {
        if a == b {
            return Ok(());
        }
        self.room_ref(b)?;
        let ra = self.room_mut(a)?;
        if !ra.adjacent.contains(&b) {
            ra.adjacent.push(b);
        }
        let rb = self.room_mut(b)?;
        if !rb.adjacent.contains(&a) {
            rb.adjacent.push(a);
        }
        Ok(())
    }

    /// Finds the walls bounding a room.
    ///
    /// A top-level wall bounds the room when it runs parallel to one of the
    /// room edges (within `angle_tolerance`) and the edge midpoint lies within
    /// half the wall thickness plus `margin` of its centerline. The result is
    /// stored on the room and returned in wall storage order.
    pub fn compute_surrounding_walls(
        &mut self,
        room: RoomKey,
        margin: f64,
        angle_tolerance: f64,
    ) -> Result<Vec<WallKey>> {
        let polygon = self.room_ref(room)?.polygon.clone();
        let found: Vec<WallKey> = self
            .walls
            .iter()
            .filter(|(_, w)| !w.is_subwall())
            .filter(|(_, w)| {
                let reach = w.thickness / 2.0 + margin;
                polygon.edges().any(|edge| {
                    !edge.is_degenerate()
                        && is_parallel(edge.angle(), w.angle(), angle_tolerance)
                        && w.line.distance_to_point(&edge.midpoint()) <= reach
                })
            })
            .map(|(k, _)| k)
            .collect();

        self.room_mut(room)?.surrounding_walls = found.clone();
        Ok(found)
    }
}
