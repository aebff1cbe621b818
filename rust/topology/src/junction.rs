// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Junction building: turning independently detected wall segments into a
//! connected graph.
//!
//! Every pair of non-parallel walls whose centerlines meet close enough to
//! both walls gets a shared node at the meeting point. Walls that stop short
//! of the meeting point are grown to it first.

use bimify_geometry::{is_parallel, Polygon, Segment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::PlanArena;
use crate::error::Result;
use crate::graph::{WallEnd, CONNECTION_TOLERANCE};
use crate::keys::{NodeKey, WallKey};
use crate::spatial::NodeIndex;

/// Tolerances for [`PlanArena::connect_walls`], in plan units and radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JunctionConfig {
    /// How far past its end a wall may be grown to reach a junction
    pub join_max_length: f64,
    /// Walls closer than this in direction are treated as parallel
    pub angle_tolerance: f64,
    /// Junction points closer than this share one node
    pub node_merge_tolerance: f64,
}

impl Default for JunctionConfig {
    fn default() -> Self {
        Self {
            join_max_length: 45.0,
            angle_tolerance: 3f64.to_radians(),
            node_merge_tolerance: 2.0,
        }
    }
}

impl PlanArena {
    /// Connects all top-level walls at their pairwise junctions.
    ///
    /// Returns the junction nodes in creation order. Pairs are visited in
    /// wall storage order, so the result is deterministic for a given input.
    pub fn connect_walls(&mut self, config: &JunctionConfig) -> Result<Vec<NodeKey>> {
        let walls: Vec<WallKey> = self
            .walls
            .iter()
            .filter(|(_, w)| !w.is_subwall() && w.extension_of.is_none())
            .map(|(k, _)| k)
            .collect();

        let mut index = NodeIndex::from_arena(self, config.node_merge_tolerance.max(1.0));
        let mut junctions = Vec::new();

        for (i, &a) in walls.iter().enumerate() {
            for &b in &walls[i + 1..] {
                let la = self.wall_ref(a)?.line;
                let lb = self.wall_ref(b)?.line;
                if is_parallel(la.angle(), lb.angle(), config.angle_tolerance) {
                    continue;
                }
                let Some((sa, sb)) = la.line_intersection_params(&lb) else {
                    continue;
                };
                let join = config.join_max_length;
                if !reaches(sa, la.length(), join) || !reaches(sb, lb.length(), join) {
                    continue;
                }

                let point = la.point_at(sa);
                let node = self.find_or_add_node(&mut index, point, config.node_merge_tolerance);
                self.attach_to_junction(a, node)?;
                self.attach_to_junction(b, node)?;
                if !junctions.contains(&node) {
                    junctions.push(node);
                }
            }
        }

        debug!(walls = walls.len(), junctions = junctions.len(), "connected walls");
        Ok(junctions)
    }

    /// Connects `wall` to `node`, first growing the wall when the node lies
    /// past one of its ends.
    ///
    /// The decision uses the node's own position projected on the wall, not
    /// the raw junction point: a merged node can sit on an end the wall
    /// already reaches, and such a node is connected there without growing
    /// anything.
    fn attach_to_junction(&mut self, wall: WallKey, node: NodeKey) -> Result<()> {
        let w = self.wall_ref(wall)?;
        if w.offset_of(node).is_some() {
            return Ok(());
        }
        let target = self
            .nodes
            .get(node)
            .map(|n| n.position)
            .ok_or(crate::error::Error::NodeNotFound(node))?;
        let length = w.length();
        let dir = w.line.direction().ok_or(crate::error::Error::DegenerateWall {
            x: w.line.start.x,
            y: w.line.start.y,
        })?;
        let along = (target - w.line.start).dot(&dir);

        let (host, offset) = if along < -CONNECTION_TOLERANCE {
            let host = self.extend_wall(wall, WallEnd::Start, target)?;
            let offset = if host == wall {
                0.0
            } else {
                self.wall_ref(host)?.length()
            };
            (host, offset)
        } else if along > length + CONNECTION_TOLERANCE {
            let host = self.extend_wall(wall, WallEnd::End, target)?;
            (host, self.wall_ref(host)?.length())
        } else {
            (wall, along.clamp(0.0, length))
        };

        if self.wall_ref(host)?.offset_of(node).is_none() {
            self.connect_wall_to_node(host, node, offset)?;
        }
        Ok(())
    }

    /// Splits a wall into subwalls between consecutive junctions.
    ///
    /// Cuts are made at every connection strictly inside the wall. A wall
    /// with no interior junction, or one already split, yields nothing.
    pub fn split_at_junctions(&mut self, wall: WallKey) -> Result<Vec<WallKey>> {
        let w = self.wall_ref(wall)?;
        if !w.subwalls.is_empty() || w.is_subwall() {
            return Ok(Vec::new());
        }
        let length = w.length();
        let line = w.line;
        let thickness = w.thickness;

        let mut cuts = vec![0.0];
        for c in &w.connections {
            let last = cuts.last().copied().unwrap_or(0.0);
            if c.offset > CONNECTION_TOLERANCE
                && c.offset < length - CONNECTION_TOLERANCE
                && c.offset - last > CONNECTION_TOLERANCE
            {
                cuts.push(c.offset);
            }
        }
        if cuts.len() < 2 {
            return Ok(Vec::new());
        }
        cuts.push(length);

        let mut pieces = Vec::with_capacity(cuts.len() - 1);
        for pair in cuts.windows(2) {
            let piece = Segment::new(line.point_at(pair[0]), line.point_at(pair[1]));
            let polygon = Polygon::from_centerline(&piece, thickness)?;
            pieces.push(self.split_wall(wall, polygon, piece, thickness)?);
        }
        debug!(wall = ?wall, pieces = pieces.len(), "split wall at junctions");
        Ok(pieces)
    }
}

fn reaches(param: f64, length: f64, join: f64) -> bool {
    param >= -join && param <= length + join
}
