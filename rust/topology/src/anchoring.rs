// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Anchoring and orienting objects against walls.
//!
//! Probes are cast through the object center along the footprint edges the
//! object's [`WallSide`] mode cares about. The probe hit nearest to the
//! center becomes the anchor point; the object is turned to face away from
//! the hit wall and slid so its near face sits on the anchor.

use std::f64::consts::{FRAC_PI_2, PI};

use bimify_geometry::{wrap_angle, Point2, Segment, SegmentIntersection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::PlanArena;
use crate::error::Result;
use crate::keys::ObjectKey;
use crate::object::{BedSize, ObjectKind, WallSide, DOUBLE_BED, SINGLE_BED};
use crate::spatial::WallIndex;

/// Anchoring distances, in plan units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// How far past the footprint a probe reaches
    pub ray_margin: f64,
    /// Search radius around the footprint for walls, when the object has no
    /// room
    pub wall_search_radius: f64,
    /// Beds narrower than this are single beds
    pub single_bed_width: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            ray_margin: 56.7,
            wall_search_radius: 113.4,
            single_bed_width: 136.1,
        }
    }
}

/// What anchoring found for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorOutcome {
    pub anchor: Point2<f64>,
    pub rotation: f64,
    pub next_to_wall: bool,
    /// Probes that were cast, in test order
    pub probes: Vec<Segment>,
}

struct Hit {
    point: Point2<f64>,
    /// Orientation of the hit wall or room edge
    reference_angle: f64,
    /// Length of the footprint edge whose probe produced the hit
    edge_length: f64,
}

fn collect_hits(probe: &Segment, target: &Segment, angle: f64, edge_length: f64, hits: &mut Vec<Hit>) {
    let mut push = |point| {
        hits.push(Hit {
            point,
            reference_angle: angle,
            edge_length,
        })
    };
    match probe.intersection(target) {
        SegmentIntersection::None => {}
        SegmentIntersection::Point(p) => push(p),
        SegmentIntersection::Overlap(o) => {
            push(o.start);
            push(o.end);
        }
    }
}

/// Picks the orientation perpendicular to `wall_angle` closest to `raw`.
fn snap_to_wall(raw: f64, wall_angle: f64) -> f64 {
    let w1 = if wall_angle > 0.0 {
        wall_angle - FRAC_PI_2
    } else {
        wall_angle + FRAC_PI_2
    };
    let w2 = if w1 > 0.0 { w1 - PI } else { w1 + PI };
    if wrap_angle(raw - w1).abs() < wrap_angle(raw - w2).abs() {
        w1
    } else {
        w2
    }
}

impl PlanArena {
    /// Anchors and orients one object.
    ///
    /// Objects inside a room are probed against the room boundary; objects
    /// without a room against the long faces of walls near them, looked up in
    /// `walls`. The object's depth, width, anchor, rotation and footprint are
    /// updated in place. Beds are also sized single or double.
    pub fn anchor_object(
        &mut self,
        object: ObjectKey,
        walls: Option<&WallIndex>,
        config: &AnchorConfig,
    ) -> Result<AnchorOutcome> {
        let obj = self.object_ref(object)?;
        let footprint = obj.footprint.clone();
        let center = footprint.centroid();
        let lengths = footprint.edge_lengths();
        let n = lengths.len();

        let mut max_idx = 0;
        let mut min_idx = 0;
        for (i, &len) in lengths.iter().enumerate() {
            if len > lengths[max_idx] {
                max_idx = i;
            }
            if len < lengths[min_idx] {
                min_idx = i;
            }
        }
        // Square footprints: both searches land on the same edge
        if max_idx == min_idx {
            max_idx = (max_idx + 1) % n;
        }

        let mode = obj.wall_side;
        let mut tested = Vec::with_capacity(2);
        let (mut depth, mut width) = (lengths[max_idx], lengths[min_idx]);
        if matches!(mode, WallSide::Short | WallSide::Either) {
            tested.push(max_idx);
        }
        if matches!(mode, WallSide::Long | WallSide::Either) {
            tested.push(min_idx);
            depth = lengths[min_idx];
            width = lengths[max_idx];
        }

        let bed_size = (obj.kind == ObjectKind::Bed).then(|| {
            if width < config.single_bed_width {
                BedSize::Single
            } else {
                BedSize::Double
            }
        });

        let mut probes = Vec::with_capacity(tested.len());
        let mut hits: Vec<Hit> = Vec::new();
        for &i in &tested {
            let edge = footprint.edge(i);
            let Some(dir) = edge.direction() else { continue };
            let half = edge.length() / 2.0 + config.ray_margin;
            let probe = Segment::new(center - dir * half, center + dir * half);

            if let Some(room) = obj.room {
                for boundary in self.room_ref(room)?.polygon.edges() {
                    collect_hits(&probe, &boundary, boundary.angle(), edge.length(), &mut hits);
                }
            } else if let Some(index) = walls {
                let search = footprint.bounds().expanded(config.wall_search_radius);
                for wk in index.query(self, &search) {
                    let wall = self.wall_ref(wk)?;
                    for face in wall.faces() {
                        collect_hits(&probe, &face, wall.angle(), edge.length(), &mut hits);
                    }
                }
            }
            probes.push(probe);
        }

        let mut nearest: Option<(&Hit, f64)> = None;
        for hit in &hits {
            let d = (hit.point - center).norm();
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((hit, d));
            }
        }

        let (anchor, rotation, next_to_wall, shift) = match (tested.last(), nearest) {
            (None, _) => (center, 0.0, false, None),
            (Some(&last), None) => {
                let anchor = center + footprint.edge(last).vector() / 2.0;
                let to_center = center - anchor;
                (anchor, to_center.y.atan2(to_center.x) - FRAC_PI_2, false, None)
            }
            (Some(_), Some((hit, dist))) => {
                let to_center = center - hit.point;
                let raw = to_center.y.atan2(to_center.x);
                let angle = snap_to_wall(raw, hit.reference_angle);
                let shift = (dist > 0.0)
                    .then(|| -to_center * ((dist - hit.edge_length / 2.0) / dist));
                (hit.point, angle - FRAC_PI_2, true, shift)
            }
        };

        let id = obj.id;
        let o = self.object_mut(object)?;
        o.depth = depth;
        o.width = width;
        o.anchor = anchor;
        o.rotation = rotation;
        o.next_to_wall = next_to_wall;
        if let Some(delta) = shift {
            o.footprint = o.footprint.translated(&delta);
        }
        if let Some(size) = bed_size {
            o.bed_size = Some(size);
            let (type_name, nominal) = match size {
                BedSize::Single => ("bed-single", SINGLE_BED),
                BedSize::Double => ("bed-double", DOUBLE_BED),
            };
            o.type_name = type_name.to_string();
            o.nominal_size = Some(nominal);
        }
        if !next_to_wall {
            debug!(object = id, "no wall found for object");
        }

        Ok(AnchorOutcome {
            anchor,
            rotation,
            next_to_wall,
            probes,
        })
    }
}
