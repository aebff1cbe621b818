// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room sides and their linear occupancy.
//!
//! Linearizing a room turns its boundary into one [`RoomSide`] per edge and
//! records, for every object, door and window touching that edge, the stretch
//! of the edge it covers. Placement code then asks a side whether a position
//! is free.

use bimify_geometry::{wrap_angle, Point2, Polygon, Segment, SegmentClip};
use serde::{Deserialize, Serialize};

use crate::arena::PlanArena;
use crate::error::{Error, Result};
use crate::keys::{ElementKey, RoomKey};

/// A stretch `[start, end]` of a side covered by one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupancy {
    pub element: ElementKey,
    pub start: f64,
    pub end: f64,
}

impl Occupancy {
    pub fn covers(&self, position: f64) -> bool {
        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        lo <= position && position <= hi
    }
}

/// One boundary edge of a room.
#[derive(Debug, Clone)]
pub struct RoomSide {
    /// Position of the edge in the room polygon
    pub index: usize,
    /// Exact edge, used for projections
    pub segment: Segment,
    /// Edge with endpoints rounded to whole units
    pub line: Segment,
    /// Rounded length
    pub length: f64,
    /// Absolute orientation in degrees, `(-180, 180]`
    pub angle_deg: f64,
    pub occupancy: Vec<Occupancy>,
}

impl RoomSide {
    pub fn new(index: usize, segment: Segment) -> Self {
        let round = |p: Point2<f64>| Point2::new(p.x.round(), p.y.round());
        Self {
            index,
            segment,
            line: Segment::new(round(segment.start), round(segment.end)),
            length: segment.length().round(),
            angle_deg: segment.angle().to_degrees(),
            occupancy: Vec::new(),
        }
    }

    /// Distance along the side of the projection of `point`.
    pub fn position_on_side(&self, point: &Point2<f64>) -> f64 {
        self.segment.project(point)
    }

    /// Point at `position` along the side, `None` outside `[0, length]`.
    pub fn coordinates_at(&self, position: f64) -> Option<Point2<f64>> {
        if position < 0.0 || position > self.length {
            return None;
        }
        Some(self.segment.point_at(position))
    }

    /// True when `position` lies on the side and outside every occupied
    /// interval. Interval ends count as occupied.
    pub fn is_position_valid(&self, position: f64) -> bool {
        if position < 0.0 || position > self.length {
            return false;
        }
        !self.occupancy.iter().any(|o| o.covers(position))
    }

    /// Records an interval, clamped to `[0, length]`.
    pub fn occupy(&mut self, element: ElementKey, start: f64, end: f64) {
        self.occupancy.push(Occupancy {
            element,
            start: start.clamp(0.0, self.length),
            end: end.clamp(0.0, self.length),
        });
    }

    /// Records the interval of a footprint crossing this side.
    ///
    /// Only a single-piece crossing counts: touching points and multi-part
    /// crossings are ignored. Returns whether an interval was recorded.
    pub fn occupy_footprint(&mut self, element: ElementKey, footprint: &Polygon) -> bool {
        let SegmentClip::Segment(mut piece) = footprint.clip_segment(&self.segment) else {
            return false;
        };
        if wrap_angle(piece.angle() - self.segment.angle()).abs() > std::f64::consts::FRAC_PI_2 {
            piece = piece.reversed();
        }
        let start = self.position_on_side(&piece.start);
        let end = self.position_on_side(&piece.end);
        self.occupy(element, start, end);
        true
    }

    /// Records a point-like element reserving `half_width` on each side of
    /// its projected position.
    pub fn occupy_point(&mut self, element: ElementKey, point: &Point2<f64>, half_width: f64) {
        let at = self.position_on_side(point);
        self.occupy(element, at - half_width, at + half_width);
    }
}

/// Margins used when linearizing rooms, in plan units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideConfig {
    /// Outward buffer applied to object footprints
    pub object_buffer: f64,
    /// Added to the host wall thickness for door and window footprints
    pub opening_margin: f64,
    /// Half of the stretch an outlet reserves
    pub outlet_half_width: f64,
}

impl Default for SideConfig {
    fn default() -> Self {
        Self {
            object_buffer: 7.9,
            opening_margin: 22.7,
            outlet_half_width: 5.0,
        }
    }
}

impl PlanArena {
    /// Rebuilds the sides of a room and their occupancy.
    ///
    /// Existing sides are discarded first, so linearizing twice gives the
    /// same result. Outlets already placed in the room are re-recorded on
    /// their side.
    pub fn linearize_room(&mut self, room: RoomKey, config: &SideConfig) -> Result<()> {
        let r = self.room_ref(room)?;
        let mut sides: Vec<RoomSide> = r
            .polygon
            .edges()
            .enumerate()
            .map(|(i, edge)| RoomSide::new(i, edge))
            .collect();

        let mut footprints: Vec<(ElementKey, Polygon)> = Vec::new();
        for &ok in &r.objects {
            if let Some(obj) = self.objects.get(ok) {
                footprints.push((ok.into(), obj.footprint.buffer(config.object_buffer)));
            }
        }
        for &opening in r.windows.iter().chain(&r.doors) {
            let o = self.opening_ref(opening)?;
            let thickness = self.wall_ref(o.wall)?.thickness + config.opening_margin;
            footprints.push((opening.into(), self.opening_footprint(opening, Some(thickness))?));
        }

        for side in &mut sides {
            for (element, footprint) in &footprints {
                side.occupy_footprint(*element, footprint);
            }
        }

        for &outlet in &r.outlets {
            let Some(data) = self.outlets.get(outlet) else { continue };
            if let Some(side) = sides.get_mut(data.side) {
                side.occupy_point(outlet.into(), &data.position, config.outlet_half_width);
            }
        }

        let occupied: usize = sides.iter().map(|s| s.occupancy.len()).sum();
        tracing::trace!(room = r.id, sides = sides.len(), occupied, "linearized room");
        self.room_mut(room)?.sides = sides;
        Ok(())
    }

    /// Indices of the `n` longest sides, longest first. Ties keep boundary
    /// order.
    pub fn longest_sides(&self, room: RoomKey, n: usize) -> Result<Vec<usize>> {
        let r = self.room_ref(room)?;
        let mut order: Vec<usize> = (0..r.sides.len()).collect();
        order.sort_by(|&a, &b| r.sides[b].length.total_cmp(&r.sides[a].length));
        order.truncate(n);
        Ok(order)
    }

    pub fn room_side(&self, room: RoomKey, index: usize) -> Result<&RoomSide> {
        self.room_ref(room)?
            .sides
            .get(index)
            .ok_or(Error::SideNotFound { room, index })
    }

    /// Whether `position` on side `index` of `room` is free.
    pub fn is_position_valid(&self, room: RoomKey, index: usize, position: f64) -> Result<bool> {
        Ok(self.room_side(room, index)?.is_position_valid(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use approx::assert_relative_eq;

    fn side(x1: f64, y1: f64, x2: f64, y2: f64) -> RoomSide {
        RoomSide::new(0, Segment::from_coords(x1, y1, x2, y2))
    }

    #[test]
    fn side_measures_are_rounded() {
        let s = side(0.2, 0.0, 100.4, 0.0);
        assert_eq!(s.line.start, Point2::new(0.0, 0.0));
        assert_eq!(s.length, 100.0);
        assert_relative_eq!(s.angle_deg, 0.0);
    }

    #[test]
    fn position_validity() {
        let mut s = side(0.0, 0.0, 100.0, 0.0);
        let mut objects: slotmap::SlotMap<crate::keys::ObjectKey, ()> = slotmap::SlotMap::with_key();
        let k = objects.insert(());
        s.occupy(k.into(), 20.0, 40.0);

        assert!(s.is_position_valid(10.0));
        assert!(!s.is_position_valid(20.0));
        assert!(!s.is_position_valid(30.0));
        assert!(!s.is_position_valid(40.0));
        assert!(s.is_position_valid(41.0));
        assert!(!s.is_position_valid(-1.0));
        assert!(!s.is_position_valid(101.0));
    }

    #[test]
    fn occupancy_is_clamped() {
        let mut s = side(0.0, 0.0, 100.0, 0.0);
        let mut objects: slotmap::SlotMap<crate::keys::ObjectKey, ()> = slotmap::SlotMap::with_key();
        let k = objects.insert(());
        s.occupy_point(k.into(), &Point2::new(2.0, 0.0), 5.0);
        s.occupy_point(k.into(), &Point2::new(99.0, 3.0), 5.0);
        assert_eq!(s.occupancy[0].start, 0.0);
        assert_eq!(s.occupancy[0].end, 7.0);
        assert_eq!(s.occupancy[1].start, 94.0);
        assert_eq!(s.occupancy[1].end, 100.0);
    }

    #[test]
    fn footprint_crossing_is_oriented_with_side() {
        // Side runs right to left
        let mut s = side(100.0, 0.0, 0.0, 0.0);
        let mut objects: slotmap::SlotMap<crate::keys::ObjectKey, ()> = slotmap::SlotMap::with_key();
        let k = objects.insert(());
        let fp = Polygon::rectangle(20.0, -5.0, 40.0, 5.0).unwrap();
        assert!(s.occupy_footprint(k.into(), &fp));
        let o = s.occupancy[0];
        assert_relative_eq!(o.start, 60.0, epsilon = 1e-6);
        assert_relative_eq!(o.end, 80.0, epsilon = 1e-6);
    }

    #[test]
    fn touching_footprint_is_ignored() {
        let mut s = side(0.0, 0.0, 100.0, 0.0);
        let mut objects: slotmap::SlotMap<crate::keys::ObjectKey, ()> = slotmap::SlotMap::with_key();
        let k = objects.insert(());
        // Only the corner touches the side
        let fp = Polygon::from_coords(&[(50.0, 0.0), (60.0, 10.0), (50.0, 20.0), (40.0, 10.0)]).unwrap();
        assert!(!s.occupy_footprint(k.into(), &fp));
        assert!(s.occupancy.is_empty());
    }

    #[test]
    fn coordinates_on_side() {
        let s = side(0.0, 0.0, 0.0, 50.0);
        assert_eq!(s.coordinates_at(20.0), Some(Point2::new(0.0, 20.0)));
        assert_eq!(s.coordinates_at(51.0), None);
        assert_relative_eq!(s.position_on_side(&Point2::new(7.0, 30.0)), 30.0);
    }

    #[test]
    fn linearize_records_objects_and_is_repeatable() {
        let mut arena = PlanArena::new();
        let room = arena.add_room(Polygon::rectangle(0.0, 0.0, 300.0, 200.0).unwrap(), None);
        // Sink against the bottom edge
        let obj = arena.add_object(
            ObjectKind::Sink,
            Polygon::rectangle(100.0, 0.0, 160.0, 45.0).unwrap(),
            None,
        );
        arena.assign_object_to_room(obj, room).unwrap();

        let config = SideConfig::default();
        arena.linearize_room(room, &config).unwrap();
        arena.linearize_room(room, &config).unwrap();

        let r = arena.room(room).unwrap();
        assert_eq!(r.sides.len(), 4);
        let bottom = &r.sides[0];
        assert_eq!(bottom.occupancy.len(), 1);
        let o = bottom.occupancy[0];
        assert!(o.start >= 0.0 && o.end <= bottom.length);
        assert_relative_eq!(o.start, 100.0 - config.object_buffer, epsilon = 1e-6);
        assert_relative_eq!(o.end, 160.0 + config.object_buffer, epsilon = 1e-6);
        assert!(r.sides[2].occupancy.is_empty());

        assert!(!arena.is_position_valid(room, 0, 130.0).unwrap());
        assert!(arena.is_position_valid(room, 0, 250.0).unwrap());
        assert_eq!(arena.longest_sides(room, 2).unwrap(), vec![0, 2]);
        assert!(matches!(
            arena.is_position_valid(room, 9, 1.0),
            Err(Error::SideNotFound { .. })
        ));
    }
}
