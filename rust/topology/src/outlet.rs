// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power and data outlets placed on room sides.

use bimify_geometry::Point2;
use serde::{Deserialize, Serialize};

use crate::arena::PlanArena;
use crate::error::{Error, Result};
use crate::keys::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutletKind {
    Power,
    /// RJ45 socket
    Data,
}

impl OutletKind {
    pub const IFC_CLASS: &'static str = "IfcOutlet";

    pub fn type_name(&self) -> &'static str {
        match self {
            OutletKind::Power => "outlet-simple",
            OutletKind::Data => "outlet-rj45",
        }
    }

    pub fn predefined_type(&self) -> &'static str {
        match self {
            OutletKind::Power => "POWEROUTLET",
            OutletKind::Data => "DATAOUTLET",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutletData {
    pub id: u32,
    pub kind: OutletKind,
    /// Rounded to whole units
    pub position: Point2<f64>,
    /// Radians, measured from the downward vertical
    pub rotation: f64,
    pub room: RoomKey,
    /// Index of the room side the outlet sits on
    pub side: usize,
}

impl PlanArena {
    /// Places an outlet on side `side` of `room`, reserving `half_width` on
    /// each side of its projected position.
    #[allow(clippy::too_many_arguments)]
    pub fn add_outlet(
        &mut self,
        kind: OutletKind,
        position: Point2<f64>,
        rotation: f64,
        room: RoomKey,
        side: usize,
        half_width: f64,
        id: Option<u32>,
    ) -> Result<OutletKey> {
        let r = self.room_ref(room)?;
        if side >= r.sides.len() {
            return Err(Error::SideNotFound { room, index: side });
        }

        let id = self.registry.issue(EntityKind::Outlet, id);
        let key = self.outlets.insert(OutletData {
            id,
            kind,
            position: Point2::new(position.x.round(), position.y.round()),
            rotation,
            room,
            side,
        });

        let r = self.room_mut(room)?;
        r.sides[side].occupy_point(key.into(), &position, half_width);
        r.outlets.push(key);
        Ok(key)
    }

    /// Index of the side of `room` closest to `point`, first side on ties.
    pub fn nearest_side(&self, room: RoomKey, point: &Point2<f64>) -> Result<Option<usize>> {
        let r = self.room_ref(room)?;
        let mut best: Option<(usize, f64)> = None;
        for side in &r.sides {
            let d = side.segment.distance_to_point(point);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((side.index, d));
            }
        }
        Ok(best.map(|(i, _)| i))
    }
}
