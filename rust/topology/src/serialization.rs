// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshot of a reconstructed plan.
//!
//! The snapshot is what exporters consume: every reference is the numeric
//! identifier issued by the registry, never an arena key, so the format is
//! stable across runs and readable from any language.

use serde::{Deserialize, Serialize};

use crate::arena::PlanArena;
use crate::error::{Error, Result};
use crate::keys::*;

type Xy = [f64; 2];

fn xy(p: &bimify_geometry::Point2<f64>) -> Xy {
    [p.x, p.y]
}

/// Serializable representation of a whole plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub walls: Vec<WallSnapshot>,
    pub rooms: Vec<RoomSnapshot>,
    pub openings: Vec<OpeningSnapshot>,
    pub objects: Vec<ObjectSnapshot>,
    pub outlets: Vec<OutletSnapshot>,
    pub housings: Vec<HousingSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    pub id: u32,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u32,
    pub position: Xy,
    /// Walls meeting here, with the node's offset along each
    pub walls: Vec<ConnectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSnapshot {
    pub id: u32,
    pub start: Xy,
    pub end: Xy,
    pub thickness: f64,
    pub footprint: Vec<Xy>,
    pub nodes: Vec<ConnectionSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subwalls: Vec<u32>,
    pub extensions: [Option<u32>; 2],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub openings: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    /// `object`, `opening` or `outlet`
    pub kind: String,
    pub id: u32,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSnapshot {
    pub index: usize,
    pub line: [Xy; 2],
    pub length: f64,
    pub angle_deg: f64,
    pub occupancy: Vec<OccupancySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: u32,
    pub name: String,
    /// Category code
    pub category: String,
    pub polygon: Vec<Xy>,
    pub area: f64,
    pub objects: Vec<u32>,
    pub doors: Vec<u32>,
    pub windows: Vec<u32>,
    pub adjacent: Vec<u32>,
    pub surrounding_walls: Vec<u32>,
    pub outlets: Vec<u32>,
    pub sides: Vec<SideSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningSnapshot {
    pub id: u32,
    pub kind: String,
    pub center: Xy,
    pub wall: u32,
    pub length: f64,
    pub footprint: Vec<Xy>,
    pub rooms: [Option<u32>; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: u32,
    pub kind: String,
    pub ifc_class: String,
    pub predefined_type: String,
    pub type_name: String,
    pub footprint: Vec<Xy>,
    pub anchor: Xy,
    pub rotation: f64,
    pub depth: f64,
    pub width: f64,
    pub next_to_wall: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_size: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletSnapshot {
    pub id: u32,
    pub type_name: String,
    pub predefined_type: String,
    pub position: Xy,
    pub rotation: f64,
    pub room: u32,
    pub side: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingSnapshot {
    pub id: u32,
    pub type_code: String,
    pub area: f64,
    pub rooms: Vec<u32>,
}

impl PlanSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl PlanArena {
    /// Serializes the plan to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Creates a serializable snapshot of the plan.
    ///
    /// Stale keys (entities removed after being referenced) are dropped from
    /// reference lists.
    pub fn to_snapshot(&self) -> PlanSnapshot {
        let node_id = |k: NodeKey| self.nodes.get(k).map(|d| d.id);
        let wall_id = |k: WallKey| self.walls.get(k).map(|d| d.id);
        let room_id = |k: RoomKey| self.rooms.get(k).map(|d| d.id);
        let opening_id = |k: OpeningKey| self.openings.get(k).map(|d| d.id);
        let object_id = |k: ObjectKey| self.objects.get(k).map(|d| d.id);
        let outlet_id = |k: OutletKey| self.outlets.get(k).map(|d| d.id);
        let housing_id = |k: HousingKey| self.housings.get(k).map(|d| d.id);
        let element_id = |e: ElementKey| match e {
            ElementKey::Object(k) => object_id(k).map(|id| ("object", id)),
            ElementKey::Opening(k) => opening_id(k).map(|id| ("opening", id)),
            ElementKey::Outlet(k) => outlet_id(k).map(|id| ("outlet", id)),
        };
        let ring = |p: &bimify_geometry::Polygon| p.vertices().iter().map(xy).collect::<Vec<_>>();

        let nodes = self
            .nodes
            .values()
            .map(|n| NodeSnapshot {
                id: n.id,
                position: xy(&n.position),
                walls: n
                    .connections
                    .iter()
                    .filter_map(|c| {
                        wall_id(c.wall).map(|id| ConnectionSnapshot {
                            id,
                            offset: c.offset,
                        })
                    })
                    .collect(),
            })
            .collect();

        let walls = self
            .walls
            .values()
            .map(|w| WallSnapshot {
                id: w.id,
                start: xy(&w.line.start),
                end: xy(&w.line.end),
                thickness: w.thickness,
                footprint: ring(&w.footprint),
                nodes: w
                    .connections
                    .iter()
                    .filter_map(|c| {
                        node_id(c.node).map(|id| ConnectionSnapshot {
                            id,
                            offset: c.offset,
                        })
                    })
                    .collect(),
                parent: w.parent.and_then(wall_id),
                subwalls: w.subwalls.iter().filter_map(|&k| wall_id(k)).collect(),
                extensions: [
                    w.extensions[0].and_then(wall_id),
                    w.extensions[1].and_then(wall_id),
                ],
                openings: w.openings.iter().filter_map(|&k| opening_id(k)).collect(),
            })
            .collect();

        let rooms = self
            .rooms
            .values()
            .map(|r| RoomSnapshot {
                id: r.id,
                name: r.name.clone(),
                category: r.category.code().to_string(),
                polygon: ring(&r.polygon),
                area: r.area(),
                objects: r.objects.iter().filter_map(|&k| object_id(k)).collect(),
                doors: r.doors.iter().filter_map(|&k| opening_id(k)).collect(),
                windows: r.windows.iter().filter_map(|&k| opening_id(k)).collect(),
                adjacent: r.adjacent.iter().filter_map(|&k| room_id(k)).collect(),
                surrounding_walls: r
                    .surrounding_walls
                    .iter()
                    .filter_map(|&k| wall_id(k))
                    .collect(),
                outlets: r.outlets.iter().filter_map(|&k| outlet_id(k)).collect(),
                sides: r
                    .sides
                    .iter()
                    .map(|s| SideSnapshot {
                        index: s.index,
                        line: [xy(&s.line.start), xy(&s.line.end)],
                        length: s.length,
                        angle_deg: s.angle_deg,
                        occupancy: s
                            .occupancy
                            .iter()
                            .filter_map(|o| {
                                element_id(o.element).map(|(kind, id)| OccupancySnapshot {
                                    kind: kind.to_string(),
                                    id,
                                    start: o.start,
                                    end: o.end,
                                })
                            })
                            .collect(),
                    })
                    .collect(),
                housing: r.housing.and_then(housing_id),
            })
            .collect();

        let openings = self
            .openings
            .values()
            .filter_map(|o| {
                Some(OpeningSnapshot {
                    id: o.id,
                    kind: o.kind.as_str().to_string(),
                    center: xy(&o.center),
                    wall: wall_id(o.wall)?,
                    length: o.length,
                    footprint: ring(&o.footprint),
                    rooms: [o.rooms.0.and_then(room_id), o.rooms.1.and_then(room_id)],
                })
            })
            .collect();

        let objects = self
            .objects
            .values()
            .map(|o| {
                let catalog = o.kind.catalog();
                ObjectSnapshot {
                    id: o.id,
                    kind: o.kind.as_str().to_string(),
                    ifc_class: catalog.ifc_class.to_string(),
                    predefined_type: catalog.predefined_type.to_string(),
                    type_name: o.type_name.clone(),
                    footprint: ring(&o.footprint),
                    anchor: xy(&o.anchor),
                    rotation: o.rotation,
                    depth: o.depth,
                    width: o.width,
                    next_to_wall: o.next_to_wall,
                    nominal_size: o.nominal_size,
                    room: o.room.and_then(room_id),
                }
            })
            .collect();

        let outlets = self
            .outlets
            .values()
            .filter_map(|o| {
                Some(OutletSnapshot {
                    id: o.id,
                    type_name: o.kind.type_name().to_string(),
                    predefined_type: o.kind.predefined_type().to_string(),
                    position: xy(&o.position),
                    rotation: o.rotation,
                    room: room_id(o.room)?,
                    side: o.side,
                })
            })
            .collect();

        let housings = self
            .housings
            .values()
            .map(|h| HousingSnapshot {
                id: h.id,
                type_code: h.type_code.clone(),
                area: h.area,
                rooms: h.rooms.iter().filter_map(|&k| room_id(k)).collect(),
            })
            .collect();

        PlanSnapshot {
            nodes,
            walls,
            rooms,
            openings,
            objects,
            outlets,
            housings,
        }
    }
}
