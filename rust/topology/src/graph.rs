// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall/node graph.
//!
//! Walls are joined at nodes. Both sides keep the link: a wall stores its
//! `(node, offset)` records sorted by offset along the centerline, a node
//! stores the `(wall, offset)` records of every wall meeting there. Offsets
//! are distances from the wall start, in plan units.
//!
//! Walls can be split into subwalls (each subwall points back at the
//! original parent) and extended by chained extension walls when the end
//! that needs to grow is already joined to something else.

use bimify_geometry::{direction_insensitive, Point2, Polygon, Segment};

use crate::arena::PlanArena;
use crate::error::{Error, Result};
use crate::keys::*;

/// Offset tolerance (plan units) for treating a connection as sitting on a
/// wall end.
pub const CONNECTION_TOLERANCE: f64 = 1.0;

/// A wall meeting at a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeConnection {
    pub wall: WallKey,
    pub offset: f64,
}

/// A node sitting on a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallConnection {
    pub node: NodeKey,
    pub offset: f64,
}

/// Data stored for a node: a junction point shared by walls.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: u32,
    pub position: Point2<f64>,
    pub connections: Vec<NodeConnection>,
}

/// One end of a wall centerline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallEnd {
    Start = 0,
    End = 1,
}

/// Data stored for a wall.
#[derive(Debug, Clone)]
pub struct WallData {
    pub id: u32,
    /// Oriented centerline, never zero-length
    pub line: Segment,
    pub thickness: f64,
    pub footprint: Polygon,
    /// Sorted by offset, non-decreasing
    pub connections: Vec<WallConnection>,
    pub subwalls: Vec<WallKey>,
    pub parent: Option<WallKey>,
    /// Extension walls grown from the start and end
    pub extensions: [Option<WallKey>; 2],
    /// Set on extension walls: the wall and end they grow from
    pub extension_of: Option<(WallKey, WallEnd)>,
    pub openings: Vec<OpeningKey>,
}

impl WallData {
    pub fn length(&self) -> f64 {
        self.line.length()
    }

    /// Oriented angle of the centerline in radians.
    pub fn angle(&self) -> f64 {
        self.line.angle()
    }

    /// Angle folded into `[0, π)`.
    pub fn direction_insensitive_angle(&self) -> f64 {
        direction_insensitive(self.line.angle())
    }

    pub fn is_subwall(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_start_connected(&self) -> bool {
        self.connections
            .first()
            .is_some_and(|c| c.offset < CONNECTION_TOLERANCE)
    }

    pub fn is_end_connected(&self) -> bool {
        self.connections
            .last()
            .is_some_and(|c| c.offset > self.length() - CONNECTION_TOLERANCE)
    }

    pub fn is_connected(&self, end: WallEnd) -> bool {
        match end {
            WallEnd::Start => self.is_start_connected(),
            WallEnd::End => self.is_end_connected(),
        }
    }

    pub fn endpoint(&self, end: WallEnd) -> Point2<f64> {
        match end {
            WallEnd::Start => self.line.start,
            WallEnd::End => self.line.end,
        }
    }

    pub fn corners(&self) -> &[Point2<f64>] {
        self.footprint.vertices()
    }

    /// The two long faces of the wall: the longest footprint edge and the
    /// longest edge not touching it.
    ///
    /// A detected footprint need not be centered on the centerline. Triangles
    /// have no such pair and fall back to the centerline offset half the
    /// thickness each way.
    pub fn faces(&self) -> [Segment; 2] {
        let lengths = self.footprint.edge_lengths();
        let n = lengths.len();
        let longest = |keep: &dyn Fn(usize) -> bool| {
            (0..n).filter(|&i| keep(i)).fold(None, |best: Option<usize>, i| match best {
                Some(b) if lengths[b] >= lengths[i] => Some(b),
                _ => Some(i),
            })
        };
        let first = longest(&|_| true);
        let second = first.and_then(|f| longest(&|i| i != f && i != (f + 1) % n && (i + 1) % n != f));
        match (first, second) {
            (Some(a), Some(b)) => [self.footprint.edge(a), self.footprint.edge(b)],
            _ => {
                let half = self.thickness / 2.0;
                [self.line.offset(half), self.line.offset(-half)]
            }
        }
    }

    /// Offset of `node` on this wall, if connected.
    pub fn offset_of(&self, node: NodeKey) -> Option<f64> {
        self.connections
            .iter()
            .find(|c| c.node == node)
            .map(|c| c.offset)
    }

    /// Node sitting on the given end, within [`CONNECTION_TOLERANCE`].
    pub fn node_at(&self, end: WallEnd) -> Option<NodeKey> {
        match end {
            WallEnd::Start => self
                .connections
                .first()
                .filter(|c| c.offset < CONNECTION_TOLERANCE),
            WallEnd::End => self
                .connections
                .last()
                .filter(|c| c.offset > self.length() - CONNECTION_TOLERANCE),
        }
        .map(|c| c.node)
    }
}

impl PlanArena {
    /// Adds a node at `position`.
    pub fn add_node(&mut self, position: Point2<f64>, id: Option<u32>) -> NodeKey {
        let id = self.registry.issue(EntityKind::Node, id);
        self.nodes.insert(NodeData {
            id,
            position,
            connections: Vec::new(),
        })
    }

    /// Adds a wall. The footprint defaults to the rectangle of `thickness`
    /// around `line`.
    ///
    /// Returns [`Error::DegenerateWall`] if both centerline points coincide;
    /// no entity is created and no identifier is consumed in that case.
    pub fn add_wall(
        &mut self,
        line: Segment,
        thickness: f64,
        footprint: Option<Polygon>,
        id: Option<u32>,
    ) -> Result<WallKey> {
        if line.start == line.end || line.is_degenerate() {
            return Err(Error::DegenerateWall {
                x: line.start.x,
                y: line.start.y,
            });
        }
        let footprint = match footprint {
            Some(p) => p,
            None => Polygon::from_centerline(&line, thickness)?,
        };
        let id = self.registry.issue(EntityKind::Wall, id);
        Ok(self.walls.insert(WallData {
            id,
            line,
            thickness,
            footprint,
            connections: Vec::new(),
            subwalls: Vec::new(),
            parent: None,
            extensions: [None, None],
            extension_of: None,
            openings: Vec::new(),
        }))
    }

    /// Records that `wall` passes through `node` at `offset` from its start.
    ///
    /// Both sides get the record and the wall's list is re-sorted by offset.
    /// Connecting the same pair twice is a caller error.
    pub fn connect_wall_to_node(&mut self, wall: WallKey, node: NodeKey, offset: f64) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(Error::NodeNotFound(node));
        }
        let w = self.wall_mut(wall)?;
        w.connections.push(WallConnection { node, offset });
        w.connections.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        self.node_mut(node)?
            .connections
            .push(NodeConnection { wall, offset });
        Ok(())
    }

    /// The node after `from` along the wall, or `None` at the end.
    pub fn next_node(&self, wall: WallKey, from: NodeKey) -> Option<NodeKey> {
        let w = self.walls.get(wall)?;
        let i = w.connections.iter().position(|c| c.node == from)?;
        w.connections.get(i + 1).map(|c| c.node)
    }

    /// The node before `from` along the wall, or `None` at the start.
    pub fn previous_node(&self, wall: WallKey, from: NodeKey) -> Option<NodeKey> {
        let w = self.walls.get(wall)?;
        let i = w.connections.iter().position(|c| c.node == from)?;
        i.checked_sub(1)
            .and_then(|j| w.connections.get(j))
            .map(|c| c.node)
    }

    /// Removes a node and clears its record on every wall it was connected to.
    pub fn remove_node(&mut self, node: NodeKey) -> Result<()> {
        let data = self.nodes.remove(node).ok_or(Error::NodeNotFound(node))?;
        for conn in &data.connections {
            if let Some(w) = self.walls.get_mut(conn.wall) {
                w.connections.retain(|c| c.node != node);
            }
        }
        Ok(())
    }

    /// Creates a subwall covering `cut_line`.
    ///
    /// Splitting a subwall attaches the new piece to the original parent and
    /// drops the split subwall from the parent's list, so a parent always
    /// lists the current pieces only.
    pub fn split_wall(
        &mut self,
        wall: WallKey,
        cut_polygon: Polygon,
        cut_line: Segment,
        thickness: f64,
    ) -> Result<WallKey> {
        let existing_parent = self.wall_ref(wall)?.parent;
        let sub = self.add_wall(cut_line, thickness, Some(cut_polygon), None)?;

        let parent = match existing_parent {
            Some(parent) => {
                self.wall_mut(parent)?.subwalls.retain(|&k| k != wall);
                parent
            }
            None => wall,
        };
        self.wall_mut(sub)?.parent = Some(parent);
        self.wall_mut(parent)?.subwalls.push(sub);
        Ok(sub)
    }

    /// Grows one end of a wall to `target` and returns the wall whose end now
    /// sits on `target`.
    ///
    /// A free end is moved (connection offsets are re-based when the start
    /// moves). An end that is already joined keeps its geometry: an extension
    /// wall is chained from it instead and attached to the node sitting there.
    pub fn extend_wall(&mut self, wall: WallKey, end: WallEnd, target: Point2<f64>) -> Result<WallKey> {
        let w = self.wall_ref(wall)?;

        if !w.is_connected(end) {
            let old = w.line;
            let new_line = match end {
                WallEnd::Start => Segment::new(target, old.end),
                WallEnd::End => Segment::new(old.start, target),
            };
            let dir = new_line.direction().ok_or(Error::DegenerateWall {
                x: target.x,
                y: target.y,
            })?;
            let shift = match end {
                WallEnd::Start => (old.start - target).dot(&dir),
                WallEnd::End => 0.0,
            };
            let footprint = Polygon::from_centerline(&new_line, w.thickness)?;

            let w = self.wall_mut(wall)?;
            w.line = new_line;
            w.footprint = footprint;
            for c in &mut w.connections {
                c.offset += shift;
            }
            let updates: Vec<(NodeKey, f64)> =
                w.connections.iter().map(|c| (c.node, c.offset)).collect();
            for (node, offset) in updates {
                if let Some(n) = self.nodes.get_mut(node) {
                    for nc in n.connections.iter_mut().filter(|nc| nc.wall == wall) {
                        nc.offset = offset;
                    }
                }
            }
            return Ok(wall);
        }

        if let Some(ext) = w.extensions[end as usize] {
            return self.extend_wall(ext, WallEnd::End, target);
        }

        let from = w.endpoint(end);
        if (target - from).norm() < CONNECTION_TOLERANCE {
            return Ok(wall);
        }
        let thickness = w.thickness;
        let anchor_node = w.node_at(end);

        let ext = self.add_wall(Segment::new(from, target), thickness, None, None)?;
        self.wall_mut(ext)?.extension_of = Some((wall, end));
        self.wall_mut(wall)?.extensions[end as usize] = Some(ext);
        if let Some(node) = anchor_node {
            self.connect_wall_to_node(ext, node, 0.0)?;
        }
        tracing::debug!(wall = ?wall, extension = ?ext, ?end, "chained wall extension");
        Ok(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn horizontal(arena: &mut PlanArena, length: f64) -> WallKey {
        arena
            .add_wall(Segment::from_coords(0.0, 0.0, length, 0.0), 10.0, None, None)
            .unwrap()
    }

    #[test]
    fn degenerate_wall_is_rejected() {
        let mut arena = PlanArena::new();
        let err = arena
            .add_wall(Segment::from_coords(5.0, 5.0, 5.0, 5.0), 10.0, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateWall { .. }));
        assert_eq!(arena.wall_count(), 0);
        assert_eq!(arena.registry().peek(EntityKind::Wall), 0);
    }

    #[test]
    fn explicit_wall_id_round_trips() {
        let mut arena = PlanArena::new();
        let w = arena
            .add_wall(Segment::from_coords(0.0, 0.0, 1.0, 0.0), 1.0, None, Some(41))
            .unwrap();
        let next = horizontal(&mut arena, 10.0);
        assert_eq!(arena.wall(w).unwrap().id, 41);
        assert_eq!(arena.wall(next).unwrap().id, 42);
    }

    #[test]
    fn connections_stay_sorted() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        for offset in [70.0, 10.0, 100.0, 40.0, 0.0] {
            let node = arena.add_node(Point2::new(offset, 0.0), None);
            arena.connect_wall_to_node(wall, node, offset).unwrap();
        }
        let offsets: Vec<f64> = arena
            .wall(wall)
            .unwrap()
            .connections
            .iter()
            .map(|c| c.offset)
            .collect();
        assert_eq!(offsets, vec![0.0, 10.0, 40.0, 70.0, 100.0]);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn next_and_previous_are_inverse() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        let a = arena.add_node(Point2::new(10.0, 0.0), None);
        let b = arena.add_node(Point2::new(50.0, 0.0), None);
        let c = arena.add_node(Point2::new(90.0, 0.0), None);
        arena.connect_wall_to_node(wall, c, 90.0).unwrap();
        arena.connect_wall_to_node(wall, a, 10.0).unwrap();
        arena.connect_wall_to_node(wall, b, 50.0).unwrap();

        assert_eq!(arena.next_node(wall, a), Some(b));
        assert_eq!(arena.previous_node(wall, c), Some(b));
        assert_eq!(arena.next_node(wall, c), None);
        assert_eq!(arena.previous_node(wall, a), None);
    }

    #[test]
    fn endpoint_connectivity_uses_tolerance() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        assert!(!arena.wall(wall).unwrap().is_start_connected());

        let near_start = arena.add_node(Point2::new(0.5, 0.0), None);
        arena.connect_wall_to_node(wall, near_start, 0.5).unwrap();
        let near_end = arena.add_node(Point2::new(98.5, 0.0), None);
        arena.connect_wall_to_node(wall, near_end, 98.5).unwrap();

        let w = arena.wall(wall).unwrap();
        assert!(w.is_start_connected());
        assert!(!w.is_end_connected());
        assert_eq!(w.node_at(WallEnd::Start), Some(near_start));
        assert_eq!(w.node_at(WallEnd::End), None);
    }

    #[test]
    fn remove_node_clears_wall_records() {
        let mut arena = PlanArena::new();
        let w1 = horizontal(&mut arena, 100.0);
        let w2 = arena
            .add_wall(Segment::from_coords(100.0, 0.0, 100.0, 80.0), 10.0, None, None)
            .unwrap();
        let node = arena.add_node(Point2::new(100.0, 0.0), None);
        arena.connect_wall_to_node(w1, node, 100.0).unwrap();
        arena.connect_wall_to_node(w2, node, 0.0).unwrap();

        arena.remove_node(node).unwrap();
        assert!(arena.node(node).is_none());
        assert!(arena.wall(w1).unwrap().connections.is_empty());
        assert!(arena.wall(w2).unwrap().connections.is_empty());
        assert!(matches!(arena.remove_node(node), Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn splitting_a_subwall_reattaches_to_parent() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        let cut = Segment::from_coords(0.0, 0.0, 60.0, 0.0);
        let poly = Polygon::from_centerline(&cut, 10.0).unwrap();
        let first = arena.split_wall(wall, poly, cut, 10.0).unwrap();
        assert_eq!(arena.wall(first).unwrap().parent, Some(wall));
        assert_eq!(arena.wall(wall).unwrap().subwalls, vec![first]);

        let cut2 = Segment::from_coords(0.0, 0.0, 30.0, 0.0);
        let poly2 = Polygon::from_centerline(&cut2, 10.0).unwrap();
        let second = arena.split_wall(first, poly2, cut2, 10.0).unwrap();
        assert_eq!(arena.wall(second).unwrap().parent, Some(wall));
        assert_eq!(arena.wall(wall).unwrap().subwalls, vec![second]);
        assert!(arena.wall(second).unwrap().is_subwall());
    }

    #[test]
    fn extending_a_free_start_rebases_offsets() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        let node = arena.add_node(Point2::new(100.0, 0.0), None);
        arena.connect_wall_to_node(wall, node, 100.0).unwrap();

        let same = arena
            .extend_wall(wall, WallEnd::Start, Point2::new(-20.0, 0.0))
            .unwrap();
        assert_eq!(same, wall);
        let w = arena.wall(wall).unwrap();
        assert_relative_eq!(w.length(), 120.0);
        assert_relative_eq!(w.connections[0].offset, 120.0);
        assert_relative_eq!(arena.node(node).unwrap().connections[0].offset, 120.0);
    }

    #[test]
    fn extending_a_joined_end_chains_an_extension() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        let node = arena.add_node(Point2::new(100.0, 0.0), None);
        arena.connect_wall_to_node(wall, node, 100.0).unwrap();

        let ext = arena
            .extend_wall(wall, WallEnd::End, Point2::new(130.0, 0.0))
            .unwrap();
        assert_ne!(ext, wall);
        assert_relative_eq!(arena.wall(wall).unwrap().length(), 100.0);
        assert_eq!(arena.wall(wall).unwrap().extensions[1], Some(ext));

        let e = arena.wall(ext).unwrap();
        assert_relative_eq!(e.length(), 30.0);
        assert_eq!(e.extension_of, Some((wall, WallEnd::End)));
        assert_eq!(e.node_at(WallEnd::Start), Some(node));
    }

    #[test]
    fn extending_to_a_joined_end_adds_nothing() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        let node = arena.add_node(Point2::new(100.0, 0.0), None);
        arena.connect_wall_to_node(wall, node, 100.0).unwrap();

        let host = arena
            .extend_wall(wall, WallEnd::End, Point2::new(100.5, 0.0))
            .unwrap();
        assert_eq!(host, wall);
        assert_eq!(arena.wall(wall).unwrap().extensions, [None, None]);
        assert_eq!(arena.wall_count(), 1);
    }

    #[test]
    fn wall_faces_are_offset_by_half_thickness() {
        let mut arena = PlanArena::new();
        let wall = horizontal(&mut arena, 100.0);
        let faces = arena.wall(wall).unwrap().faces();
        let mut ys: Vec<f64> = faces.iter().map(|f| f.start.y).collect();
        ys.sort_by(f64::total_cmp);
        assert_relative_eq!(ys[0], -5.0);
        assert_relative_eq!(ys[1], 5.0);
        for face in faces {
            assert_relative_eq!(face.length(), 100.0);
            assert_relative_eq!(face.start.y, face.end.y);
        }
    }

    #[test]
    fn faces_follow_a_detected_footprint() {
        let mut arena = PlanArena::new();
        let footprint = Polygon::rectangle(0.0, 0.0, 100.0, 10.0).unwrap();
        let wall = arena
            .add_wall(Segment::from_coords(0.0, 0.0, 100.0, 0.0), 10.0, Some(footprint), None)
            .unwrap();
        let [a, b] = arena.wall(wall).unwrap().faces();
        // Edge 0 runs along y = 0, edge 2 along y = 10
        assert_relative_eq!(a.start.y, 0.0);
        assert_relative_eq!(b.start.y, 10.0);
    }
}
