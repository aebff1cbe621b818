// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Movable objects: furniture and sanitary fixtures.
//!
//! Every object kind carries a constant [`ObjectCatalog`] entry with its
//! building-model class, nominal dimensions and which of its sides goes
//! against a wall.

use bimify_geometry::{Point2, Polygon, Vector2};
use serde::{Deserialize, Serialize};

use crate::arena::PlanArena;
use crate::error::Result;
use crate::keys::*;

/// Object classes produced by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Bed,
    Sink,
    Wc,
    Shower,
    Bath,
    Furniture,
}

/// Which side of an object is placed against a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    Long,
    Short,
    Either,
    Neither,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedSize {
    Single,
    Double,
}

/// Constant per-kind properties. Lengths are in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectCatalog {
    pub ifc_class: &'static str,
    pub predefined_type: &'static str,
    pub type_name: &'static str,
    /// Nominal `(width, depth)`, when the kind has a fixed size
    pub nominal_size: Option<(f64, f64)>,
    /// Smallest accepted short edge for a detection
    pub shortest_edge: f64,
    /// Smallest accepted long edge for a detection
    pub shortest_long_edge: Option<f64>,
    pub wall_side: WallSide,
}

pub const SINGLE_BED: (f64, f64) = (0.90, 1.90);
pub const DOUBLE_BED: (f64, f64) = (1.60, 2.00);

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Bed => "bed",
            ObjectKind::Sink => "sink",
            ObjectKind::Wc => "wc",
            ObjectKind::Shower => "shower",
            ObjectKind::Bath => "bath",
            ObjectKind::Furniture => "furniture",
        }
    }

    pub fn catalog(&self) -> ObjectCatalog {
        match self {
            ObjectKind::Bed => ObjectCatalog {
                ifc_class: "IfcFurnishingElement",
                predefined_type: "BED",
                type_name: "bed-double",
                nominal_size: Some(DOUBLE_BED),
                shortest_edge: 0.7,
                shortest_long_edge: Some(1.7),
                wall_side: WallSide::Short,
            },
            ObjectKind::Sink => ObjectCatalog {
                ifc_class: "IfcSanitaryTerminal",
                predefined_type: "SINK",
                type_name: "sink",
                nominal_size: Some((0.60, 0.45)),
                shortest_edge: 0.2,
                shortest_long_edge: None,
                wall_side: WallSide::Either,
            },
            ObjectKind::Wc => ObjectCatalog {
                ifc_class: "IfcSanitaryTerminal",
                predefined_type: "TOILETPAN",
                type_name: "wc",
                nominal_size: Some((0.37, 0.54)),
                shortest_edge: 0.25,
                shortest_long_edge: None,
                wall_side: WallSide::Short,
            },
            ObjectKind::Shower => ObjectCatalog {
                ifc_class: "IfcSanitaryTerminal",
                predefined_type: "SHOWER",
                type_name: "shower",
                nominal_size: Some((0.90, 0.90)),
                shortest_edge: 0.45,
                shortest_long_edge: None,
                wall_side: WallSide::Either,
            },
            ObjectKind::Bath => ObjectCatalog {
                ifc_class: "IfcSanitaryTerminal",
                predefined_type: "BATH",
                type_name: "bathtub",
                nominal_size: Some((1.70, 0.70)),
                shortest_edge: 0.5,
                shortest_long_edge: None,
                wall_side: WallSide::Long,
            },
            ObjectKind::Furniture => ObjectCatalog {
                ifc_class: "IfcFurnishingElement",
                predefined_type: "NOTDEFINED",
                type_name: "undefined",
                nominal_size: None,
                shortest_edge: 0.2,
                shortest_long_edge: None,
                wall_side: WallSide::Either,
            },
        }
    }
}

/// Data stored for an object.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub id: u32,
    pub kind: ObjectKind,
    pub footprint: Polygon,
    /// Catalog type name, refined for beds once their size is known
    pub type_name: String,
    pub wall_side: WallSide,
    /// Nominal `(width, depth)` in meters
    pub nominal_size: Option<(f64, f64)>,
    pub bed_size: Option<BedSize>,
    pub depth: f64,
    pub width: f64,
    pub anchor: Point2<f64>,
    /// Radians, measured from the downward vertical
    pub rotation: f64,
    pub next_to_wall: bool,
    pub room: Option<RoomKey>,
}

impl ObjectData {
    pub fn center(&self) -> Point2<f64> {
        self.footprint.centroid()
    }

    pub fn corners(&self) -> &[Point2<f64>] {
        self.footprint.vertices()
    }

    /// Footprint corners relative to the anchor point.
    pub fn relative_corners(&self) -> Vec<Vector2<f64>> {
        self.footprint
            .vertices()
            .iter()
            .map(|c| c - self.anchor)
            .collect()
    }
}

impl PlanArena {
    /// Adds an object. Its anchor starts at the footprint centroid.
    pub fn add_object(&mut self, kind: ObjectKind, footprint: Polygon, id: Option<u32>) -> ObjectKey {
        let id = self.registry.issue(EntityKind::Object, id);
        let catalog = kind.catalog();
        let anchor = footprint.centroid();
        self.objects.insert(ObjectData {
            id,
            kind,
            footprint,
            type_name: catalog.type_name.to_string(),
            wall_side: catalog.wall_side,
            nominal_size: catalog.nominal_size,
            bed_size: None,
            depth: 0.0,
            width: 0.0,
            anchor,
            rotation: 0.0,
            next_to_wall: false,
            room: None,
        })
    }

    /// Links an object and a room both ways.
    pub fn assign_object_to_room(&mut self, object: ObjectKey, room: RoomKey) -> Result<()> {
        let r = self.room_mut(room)?;
        if !r.objects.contains(&object) {
            r.objects.push(object);
        }
        self.object_mut(object)?.room = Some(room);
        Ok(())
    }

    /// Puts an object in the first room containing its centroid.
    pub fn set_room_container(&mut self, object: ObjectKey) -> Result<Option<RoomKey>> {
        let center = self.object_ref(object)?.center();
        let room = self.room_containing(&center);
        match room {
            Some(room) => self.assign_object_to_room(object, room)?,
            None => tracing::debug!(object = self.object_ref(object)?.id, "object outside every room"),
        }
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn catalog_modes() {
        assert_eq!(ObjectKind::Bed.catalog().wall_side, WallSide::Short);
        assert_eq!(ObjectKind::Bath.catalog().wall_side, WallSide::Long);
        assert_eq!(ObjectKind::Sink.catalog().wall_side, WallSide::Either);
        assert_eq!(ObjectKind::Wc.catalog().predefined_type, "TOILETPAN");
        assert_eq!(ObjectKind::Furniture.catalog().nominal_size, None);
    }

    #[test]
    fn container_is_first_room_holding_the_centroid() {
        let mut arena = PlanArena::new();
        let a = arena.add_room(Polygon::rectangle(0.0, 0.0, 100.0, 100.0).unwrap(), None);
        let _b = arena.add_room(Polygon::rectangle(100.0, 0.0, 200.0, 100.0).unwrap(), None);
        let obj = arena.add_object(
            ObjectKind::Wc,
            Polygon::rectangle(10.0, 10.0, 50.0, 70.0).unwrap(),
            None,
        );
        assert_eq!(arena.set_room_container(obj).unwrap(), Some(a));
        assert_eq!(arena.object(obj).unwrap().room, Some(a));
        assert_eq!(arena.room(a).unwrap().objects, vec![obj]);

        let outside = arena.add_object(
            ObjectKind::Sink,
            Polygon::rectangle(500.0, 500.0, 520.0, 520.0).unwrap(),
            None,
        );
        assert_eq!(arena.set_room_container(outside).unwrap(), None);
    }

    #[test]
    fn relative_corners_from_anchor() {
        let mut arena = PlanArena::new();
        let obj = arena.add_object(
            ObjectKind::Furniture,
            Polygon::rectangle(0.0, 0.0, 20.0, 10.0).unwrap(),
            None,
        );
        let rel = arena.object(obj).unwrap().relative_corners();
        assert_relative_eq!(rel[0], Vector2::new(-10.0, -5.0));
        assert_relative_eq!(rel[2], Vector2::new(10.0, 5.0));
    }
}
