// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dwelling units grouping rooms.

use crate::arena::PlanArena;
use crate::classification::RoomCategory;
use crate::error::Result;
use crate::keys::*;

#[derive(Debug, Clone)]
pub struct HousingData {
    pub id: u32,
    pub rooms: Vec<RoomKey>,
    /// `"T"` followed by the bedroom count plus one
    pub type_code: String,
    /// Sum of member room areas, in square plan units
    pub area: f64,
}

impl PlanArena {
    /// Adds an empty housing.
    pub fn add_housing(&mut self, id: Option<u32>) -> HousingKey {
        let id = self.registry.issue(EntityKind::Housing, id);
        self.housings.insert(HousingData {
            id,
            rooms: Vec::new(),
            type_code: "undefined".to_string(),
            area: 0.0,
        })
    }

    /// Adds a room to a housing and recomputes the type code and area.
    pub fn add_room_to_housing(&mut self, housing: HousingKey, room: RoomKey) -> Result<()> {
        self.room_mut(room)?.housing = Some(housing);
        let h = self
            .housings
            .get_mut(housing)
            .ok_or(crate::error::Error::HousingNotFound(housing))?;
        h.rooms.push(room);

        let mut bedrooms = 0;
        let mut area = 0.0;
        for r in h.rooms.iter().filter_map(|&k| self.rooms.get(k)) {
            if r.category == RoomCategory::Bedroom {
                bedrooms += 1;
            }
            area += r.polygon.area();
        }
        h.type_code = format!("T{}", bedrooms + 1);
        h.area = area;
        Ok(())
    }
}
