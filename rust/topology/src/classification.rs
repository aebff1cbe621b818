// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic room categories.
//!
//! A room gets its category either from the objects it contains (the rule
//! chain in [`PlanArena::classify_room`]) or straight from a detector class
//! id ([`PlanArena::classify_room_from_class_id`]). The two paths are never
//! mixed for one room.

use serde::{Deserialize, Serialize};

use crate::arena::PlanArena;
use crate::error::Result;
use crate::keys::RoomKey;
use crate::object::ObjectKind;

/// Room category, ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    #[default]
    Undefined,
    Shaft,
    Exterior,
    Access,
    Hallway,
    Stairs,
    Elevator,
    Storage,
    Laundry,
    Wc,
    Bathroom,
    Kitchen,
    LivingRoom,
    Bedroom,
}

impl RoomCategory {
    pub const ALL: [RoomCategory; 14] = [
        RoomCategory::Undefined,
        RoomCategory::Shaft,
        RoomCategory::Exterior,
        RoomCategory::Access,
        RoomCategory::Hallway,
        RoomCategory::Stairs,
        RoomCategory::Elevator,
        RoomCategory::Storage,
        RoomCategory::Laundry,
        RoomCategory::Wc,
        RoomCategory::Bathroom,
        RoomCategory::Kitchen,
        RoomCategory::LivingRoom,
        RoomCategory::Bedroom,
    ];

    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Short code used in exported property sets.
    pub fn code(&self) -> &'static str {
        match self {
            RoomCategory::Undefined => "indefini",
            RoomCategory::Shaft => "gt",
            RoomCategory::Exterior => "exterieur",
            RoomCategory::Access => "circulation",
            RoomCategory::Hallway => "couloir",
            RoomCategory::Stairs => "escalier",
            RoomCategory::Elevator => "ascenseur",
            RoomCategory::Storage => "rangement",
            RoomCategory::Laundry => "buanderie",
            RoomCategory::Wc => "wc",
            RoomCategory::Bathroom => "sdb",
            RoomCategory::Kitchen => "cuisine",
            RoomCategory::LivingRoom => "sejour",
            RoomCategory::Bedroom => "chambre",
        }
    }

    /// Display label, also used as the room name after classification.
    pub fn label(&self) -> &'static str {
        match self {
            RoomCategory::Undefined => "Indéfini",
            RoomCategory::Shaft => "GT",
            RoomCategory::Exterior => "Extérieur",
            RoomCategory::Access => "Circulation",
            RoomCategory::Hallway => "Couloir",
            RoomCategory::Stairs => "Escalier",
            RoomCategory::Elevator => "Ascenseur",
            RoomCategory::Storage => "Rangement",
            RoomCategory::Laundry => "Buanderie",
            RoomCategory::Wc => "WC",
            RoomCategory::Bathroom => "SDB",
            RoomCategory::Kitchen => "Cuisine",
            RoomCategory::LivingRoom => "Séjour",
            RoomCategory::Bedroom => "Chambre",
        }
    }

    /// RGB color in `[0, 1]`.
    pub fn color(&self) -> [f64; 3] {
        match self {
            RoomCategory::Undefined => [0.5, 0.5, 0.5],
            RoomCategory::Shaft => [0.8, 0.2, 1.0],
            RoomCategory::Exterior => [0.5, 0.8, 0.8],
            RoomCategory::Access | RoomCategory::Stairs | RoomCategory::Elevator => [0.2, 0.3, 0.2],
            RoomCategory::Hallway | RoomCategory::Storage | RoomCategory::Laundry => [0.2, 0.8, 1.0],
            RoomCategory::Wc | RoomCategory::Bathroom => [0.5, 1.0, 0.5],
            RoomCategory::Kitchen | RoomCategory::LivingRoom => [1.0, 0.5, 0.5],
            RoomCategory::Bedroom => [0.5, 0.5, 1.0],
        }
    }

    /// Looks a category up by its code. Unknown codes map to `Undefined`.
    pub fn from_code(code: &str) -> RoomCategory {
        RoomCategory::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .unwrap_or(RoomCategory::Undefined)
    }

    /// Category for a room detector class id.
    pub fn from_class_id(class_id: u32) -> RoomCategory {
        match class_id {
            1 | 2 => RoomCategory::LivingRoom,
            3 => RoomCategory::Kitchen,
            4 => RoomCategory::Bedroom,
            5 => RoomCategory::Bathroom,
            6 => RoomCategory::Wc,
            7 => RoomCategory::Hallway,
            8 => RoomCategory::Storage,
            9 => RoomCategory::Exterior,
            10 => RoomCategory::Access,
            11 => RoomCategory::Elevator,
            12 => RoomCategory::Stairs,
            13 => RoomCategory::Shaft,
            _ => RoomCategory::Undefined,
        }
    }

    /// Shared areas that never belong to a dwelling unit.
    pub fn is_common_area(&self) -> bool {
        matches!(
            self,
            RoomCategory::Shaft
                | RoomCategory::Exterior
                | RoomCategory::Access
                | RoomCategory::Stairs
                | RoomCategory::Elevator
        )
    }
}

impl std::fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl PlanArena {
    /// Classifies a room from its area and contained objects.
    ///
    /// A small empty room is a shaft. Otherwise the first bed makes it a
    /// bedroom, the first wc, shower or bath makes it a bathroom, and a sink
    /// with neither makes it a living room. The room name becomes the
    /// category label.
    pub fn classify_room(&mut self, room: RoomKey, max_shaft_area: f64) -> Result<RoomCategory> {
        let r = self.room_ref(room)?;
        let mut category = r.category;

        if r.polygon.area() < max_shaft_area && r.objects.is_empty() {
            category = RoomCategory::Shaft;
        }

        if category == RoomCategory::Undefined {
            let mut has_sink = false;
            for &ok in &r.objects {
                let Some(obj) = self.objects.get(ok) else { continue };
                match obj.kind {
                    ObjectKind::Bed => {
                        category = RoomCategory::Bedroom;
                        break;
                    }
                    ObjectKind::Wc | ObjectKind::Shower | ObjectKind::Bath => {
                        category = RoomCategory::Bathroom;
                        break;
                    }
                    ObjectKind::Sink => has_sink = true,
                    ObjectKind::Furniture => {}
                }
            }
            if category == RoomCategory::Undefined && has_sink {
                category = RoomCategory::LivingRoom;
            }
        }

        self.set_room_category(room, category)?;
        Ok(category)
    }

    /// Classifies a room from a detector class id.
    pub fn classify_room_from_class_id(&mut self, room: RoomKey, class_id: u32) -> Result<RoomCategory> {
        let category = RoomCategory::from_class_id(class_id);
        self.set_room_category(room, category)?;
        Ok(category)
    }

    fn set_room_category(&mut self, room: RoomKey, category: RoomCategory) -> Result<()> {
        let r = self.room_mut(room)?;
        r.category = category;
        r.name = category.label().to_string();
        if category == RoomCategory::Undefined {
            tracing::debug!(room = r.id, "room left undefined");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bimify_geometry::Polygon;

    fn square(arena: &mut PlanArena, size: f64) -> RoomKey {
        arena.add_room(Polygon::rectangle(0.0, 0.0, size, size).unwrap(), None)
    }

    fn place(arena: &mut PlanArena, room: RoomKey, kind: ObjectKind) {
        let fp = Polygon::rectangle(10.0, 10.0, 30.0, 40.0).unwrap();
        let obj = arena.add_object(kind, fp, None);
        arena.assign_object_to_room(obj, room).unwrap();
    }

    #[test]
    fn small_empty_room_is_a_shaft() {
        let mut arena = PlanArena::new();
        let room = square(&mut arena, 10.0);
        let category = arena.classify_room(room, 113.0 * 113.0).unwrap();
        assert_eq!(category, RoomCategory::Shaft);
        assert_eq!(arena.room(room).unwrap().name, "GT");
    }

    #[test]
    fn bed_makes_a_bedroom_before_bathroom_fixtures() {
        let mut arena = PlanArena::new();
        let room = square(&mut arena, 400.0);
        place(&mut arena, room, ObjectKind::Sink);
        place(&mut arena, room, ObjectKind::Bed);
        place(&mut arena, room, ObjectKind::Wc);
        assert_eq!(arena.classify_room(room, 100.0).unwrap(), RoomCategory::Bedroom);
    }

    #[test]
    fn sink_alone_makes_a_living_room() {
        let mut arena = PlanArena::new();
        let room = square(&mut arena, 400.0);
        place(&mut arena, room, ObjectKind::Sink);
        place(&mut arena, room, ObjectKind::Furniture);
        assert_eq!(arena.classify_room(room, 100.0).unwrap(), RoomCategory::LivingRoom);
    }

    #[test]
    fn large_empty_room_stays_undefined() {
        let mut arena = PlanArena::new();
        let room = square(&mut arena, 400.0);
        assert_eq!(arena.classify_room(room, 100.0).unwrap(), RoomCategory::Undefined);
        assert_eq!(arena.room(room).unwrap().name, "Indéfini");
    }

    #[test]
    fn class_id_table() {
        assert_eq!(RoomCategory::from_class_id(1), RoomCategory::LivingRoom);
        assert_eq!(RoomCategory::from_class_id(2), RoomCategory::LivingRoom);
        assert_eq!(RoomCategory::from_class_id(6), RoomCategory::Wc);
        assert_eq!(RoomCategory::from_class_id(13), RoomCategory::Shaft);
        assert_eq!(RoomCategory::from_class_id(0), RoomCategory::Undefined);
        assert_eq!(RoomCategory::from_class_id(99), RoomCategory::Undefined);

        let mut arena = PlanArena::new();
        let room = square(&mut arena, 10.0);
        // The class-id path ignores area and contents
        let c = arena.classify_room_from_class_id(room, 3).unwrap();
        assert_eq!(c, RoomCategory::Kitchen);
        assert_eq!(arena.room(room).unwrap().name, "Cuisine");
    }

    #[test]
    fn codes_round_trip() {
        for c in RoomCategory::ALL {
            assert_eq!(RoomCategory::from_code(c.code()), c);
        }
        assert_eq!(RoomCategory::from_code("nope"), RoomCategory::Undefined);
        assert_eq!(RoomCategory::Bedroom.id(), 13);
    }
}
