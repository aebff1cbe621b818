// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Doors and windows hosted in walls, and the rooms they connect.

use std::f64::consts::{FRAC_PI_2, PI};

use bimify_geometry::{Point2, Polygon, Segment, Vector2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::PlanArena;
use crate::error::Result;
use crate::keys::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl OpeningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpeningKind::Door => "door",
            OpeningKind::Window => "window",
        }
    }
}

/// Data stored for an opening.
#[derive(Debug, Clone)]
pub struct OpeningData {
    pub id: u32,
    pub kind: OpeningKind,
    pub center: Point2<f64>,
    /// Host wall, fixed for the opening's lifetime
    pub wall: WallKey,
    /// Extent along the host wall
    pub length: f64,
    /// Thickness of the nominal footprint
    pub thickness: f64,
    pub footprint: Polygon,
    /// Rooms found on the first and second probe side
    pub rooms: (Option<RoomKey>, Option<RoomKey>),
}

impl OpeningData {
    /// Whether the opening leads from one room into another.
    pub fn connects_two_rooms(&self) -> bool {
        matches!(self.rooms, (Some(a), Some(b)) if a != b)
    }
}

/// Opening tolerances, in plan units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningConfig {
    /// Added to half the wall thickness to place the adjacency probes
    pub probe_clearance: f64,
    /// Thickness of the nominal opening footprint
    pub default_thickness: f64,
}

impl Default for OpeningConfig {
    fn default() -> Self {
        Self {
            probe_clearance: 34.0,
            default_thickness: 4.5,
        }
    }
}

/// Rectangle of an opening along a wall direction.
///
/// The rectangle is one unit shorter than the opening at each end so it
/// does not bleed into the neighbouring wall segment.
pub fn opening_rectangle(center: Point2<f64>, wall_angle: f64, length: f64, thickness: f64) -> Result<Polygon> {
    let dir = Vector2::new(wall_angle.cos(), wall_angle.sin());
    let mut half = length / 2.0 - 1.0;
    if half <= 0.0 {
        half = length / 2.0;
    }
    let axis = Segment::new(center - dir * half, center + dir * half);
    Ok(Polygon::from_centerline(&axis, thickness)?)
}

impl PlanArena {
    /// Adds an opening hosted by `wall`.
    pub fn add_opening(
        &mut self,
        kind: OpeningKind,
        center: Point2<f64>,
        wall: WallKey,
        length: f64,
        thickness: f64,
        id: Option<u32>,
    ) -> Result<OpeningKey> {
        let angle = self.wall_ref(wall)?.angle();
        let footprint = opening_rectangle(center, angle, length, thickness)?;
        let id = self.registry.issue(EntityKind::Opening, id);
        let key = self.openings.insert(OpeningData {
            id,
            kind,
            center,
            wall,
            length,
            thickness,
            footprint,
            rooms: (None, None),
        });
        self.wall_mut(wall)?.openings.push(key);
        Ok(key)
    }

    /// Footprint of an opening with an explicit thickness, or the nominal
    /// footprint when `thickness` is `None`.
    pub fn opening_footprint(&self, opening: OpeningKey, thickness: Option<f64>) -> Result<Polygon> {
        let o = self.opening_ref(opening)?;
        match thickness {
            None => Ok(o.footprint.clone()),
            Some(t) => {
                let angle = self.wall_ref(o.wall)?.angle();
                opening_rectangle(o.center, angle, o.length, t)
            }
        }
    }

    /// Finds the rooms on either side of an opening.
    ///
    /// Two probes are placed across the host wall at half its thickness plus
    /// `clearance` from the center. Each probe takes the first room that
    /// contains it. The opening is listed as a door or window of every room
    /// found, and two distinct rooms become adjacent. Both probes landing in
    /// the same room count as a single side.
    pub fn resolve_adjacent_rooms(
        &mut self,
        opening: OpeningKey,
        clearance: f64,
    ) -> Result<(Option<RoomKey>, Option<RoomKey>)> {
        let o = self.opening_ref(opening)?;
        let (center, kind) = (o.center, o.kind);
        let wall = self.wall_ref(o.wall)?;

        let distance = wall.thickness / 2.0 + clearance;
        let across = (wall.direction_insensitive_angle() + FRAC_PI_2) % PI;
        let step = Vector2::new(across.cos(), across.sin()) * distance;

        let first = self.room_containing(&(center + step));
        let mut second = self.room_containing(&(center - step));
        if second.is_some() && second == first {
            second = None;
        }

        for room in [first, second].into_iter().flatten() {
            let r = self.room_mut(room)?;
            let list = match kind {
                OpeningKind::Door => &mut r.doors,
                OpeningKind::Window => &mut r.windows,
            };
            if !list.contains(&opening) {
                list.push(opening);
            }
        }
        if let (Some(a), Some(b)) = (first, second) {
            self.connect_rooms(a, b)?;
        }

        let o = self.opening_mut(opening)?;
        o.rooms = (first, second);
        if first.is_none() || second.is_none() {
            debug!(opening = o.id, kind = kind.as_str(), "opening is one-sided");
        }
        Ok((first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two rooms side by side, split by a vertical wall at x = 200.
    fn two_rooms() -> (PlanArena, WallKey, RoomKey, RoomKey) {
        let mut arena = PlanArena::new();
        let wall = arena
            .add_wall(Segment::from_coords(200.0, 0.0, 200.0, 200.0), 10.0, None, None)
            .unwrap();
        let left = arena.add_room(Polygon::rectangle(0.0, 0.0, 195.0, 200.0).unwrap(), None);
        let right = arena.add_room(Polygon::rectangle(205.0, 0.0, 400.0, 200.0).unwrap(), None);
        (arena, wall, left, right)
    }

    #[test]
    fn door_between_two_rooms() {
        let (mut arena, wall, left, right) = two_rooms();
        let door = arena
            .add_opening(OpeningKind::Door, Point2::new(200.0, 100.0), wall, 90.0, 4.5, None)
            .unwrap();
        let (a, b) = arena.resolve_adjacent_rooms(door, 34.0).unwrap();

        let mut found = vec![a.unwrap(), b.unwrap()];
        found.sort();
        let mut expected = vec![left, right];
        expected.sort();
        assert_eq!(found, expected);
        assert!(arena.opening(door).unwrap().connects_two_rooms());

        assert_eq!(arena.room(left).unwrap().doors, vec![door]);
        assert_eq!(arena.room(right).unwrap().doors, vec![door]);
        assert_eq!(arena.room(left).unwrap().adjacent, vec![right]);
        assert_eq!(arena.room(right).unwrap().adjacent, vec![left]);
        assert_eq!(arena.wall(wall).unwrap().openings, vec![door]);

        // Resolving again adds nothing
        arena.resolve_adjacent_rooms(door, 34.0).unwrap();
        assert_eq!(arena.room(left).unwrap().doors.len(), 1);
        assert_eq!(arena.room(left).unwrap().adjacent.len(), 1);
    }

    #[test]
    fn exterior_window_is_one_sided() {
        let mut arena = PlanArena::new();
        let wall = arena
            .add_wall(Segment::from_coords(0.0, 0.0, 300.0, 0.0), 20.0, None, None)
            .unwrap();
        let room = arena.add_room(Polygon::rectangle(0.0, 10.0, 300.0, 200.0).unwrap(), None);
        let window = arena
            .add_opening(OpeningKind::Window, Point2::new(150.0, 0.0), wall, 120.0, 4.5, None)
            .unwrap();
        let rooms = arena.resolve_adjacent_rooms(window, 34.0).unwrap();
        assert_eq!(rooms, (Some(room), None));
        assert_eq!(arena.room(room).unwrap().windows, vec![window]);
        assert!(arena.room(room).unwrap().adjacent.is_empty());
    }

    #[test]
    fn both_probes_in_one_room() {
        let mut arena = PlanArena::new();
        let wall = arena
            .add_wall(Segment::from_coords(100.0, 50.0, 100.0, 150.0), 10.0, None, None)
            .unwrap();
        let room = arena.add_room(Polygon::rectangle(0.0, 0.0, 400.0, 200.0).unwrap(), None);
        let door = arena
            .add_opening(OpeningKind::Door, Point2::new(100.0, 100.0), wall, 80.0, 4.5, None)
            .unwrap();
        let rooms = arena.resolve_adjacent_rooms(door, 34.0).unwrap();
        assert_eq!(rooms, (Some(room), None));
        assert!(!arena.opening(door).unwrap().connects_two_rooms());
        assert!(arena.room(room).unwrap().adjacent.is_empty());
    }

    #[test]
    fn footprint_follows_wall_direction() {
        let (mut arena, wall, _, _) = two_rooms();
        let door = arena
            .add_opening(OpeningKind::Door, Point2::new(200.0, 100.0), wall, 90.0, 4.0, None)
            .unwrap();
        let nominal = arena.opening_footprint(door, None).unwrap();
        let b = nominal.bounds();
        assert_relative_eq!(b.width(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(b.height(), 88.0, epsilon = 1e-9);

        let thick = arena.opening_footprint(door, Some(30.0)).unwrap();
        assert_relative_eq!(thick.bounds().width(), 30.0, epsilon = 1e-9);
    }
}
