// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ordered reconstruction pipeline.
//!
//! Stages run strictly forward: walls are joined before rooms are
//! linearized, openings are resolved before rooms are classified, and
//! objects are anchored once their room is known and the wall index exists.

use bimify_geometry::{Point2, Polygon, Segment};
use bimify_topology::{PlanArena, RoomCategory, RoomKey, WallIndex, WallKey};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ReconstructionConfig;
use crate::error::Result;
use crate::housing::group_housings;
use crate::types::{polygon_from, DetectedPlan, Point2D};

/// Finalized topology and what happened to the detections on the way.
#[derive(Debug)]
pub struct Reconstruction {
    pub arena: PlanArena,
    pub summary: ReconstructionSummary,
}

/// Entity counts after reconstruction, plus the detections that were
/// dropped or left unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionSummary {
    pub walls: usize,
    pub nodes: usize,
    /// Room, opening, object and wall footprints that are not polygons
    pub invalid_footprints: usize,
    pub rooms: usize,
    /// Room detections below the minimum area
    pub small_rooms: usize,
    pub openings: usize,
    /// Openings with no wall nearby
    pub unhosted_openings: usize,
    /// Openings with a room on at most one side
    pub one_sided_openings: usize,
    pub objects: usize,
    /// Objects whose probes hit no wall or room edge
    pub free_objects: usize,
    /// Openings and objects below the score threshold
    pub low_score: usize,
    pub outlets: usize,
    /// Outlets outside every room
    pub unplaced_outlets: usize,
    pub undefined_rooms: usize,
    pub housings: usize,
}

/// Runs every stage on one plan.
///
/// A degenerate wall aborts the run. Everything else that cannot be
/// resolved is skipped or left unresolved in the result, and counted in
/// the summary. A wall whose footprint is malformed keeps the rectangle
/// around its centerline.
pub fn reconstruct(plan: &DetectedPlan, config: &ReconstructionConfig) -> Result<Reconstruction> {
    config.validate()?;
    let mut arena = PlanArena::new();
    let mut summary = ReconstructionSummary::default();
    let upm = config.units_per_meter();

    // 1. Walls
    for (index, w) in plan.walls.iter().enumerate() {
        let footprint = if w.footprint.len() >= 3 {
            polygon("wall", index, &w.footprint, &mut summary)
        } else {
            None
        };
        let line = Segment::new(w.start.to_nalgebra(), w.end.to_nalgebra());
        arena.add_wall(line, w.thickness, footprint, w.id)?;
    }

    // 2. Junctions
    let junctions = arena.connect_walls(&config.junction_config())?;
    info!(
        walls = arena.wall_count(),
        junctions = junctions.len(),
        "wall graph built"
    );

    // 3. Rooms
    let min_room_area = config.area_to_units(config.min_room_area_m2);
    let mut room_classes: Vec<(RoomKey, Option<u32>)> = Vec::with_capacity(plan.rooms.len());
    for (index, r) in plan.rooms.iter().enumerate() {
        let Some(boundary) = polygon("room", index, &r.boundary, &mut summary) else {
            continue;
        };
        if boundary.area() < min_room_area {
            debug!(index, area = boundary.area(), "room detection too small");
            summary.small_rooms += 1;
            continue;
        }
        room_classes.push((arena.add_room(boundary, r.id), r.class_id));
    }

    // 4. Openings
    let walls = WallIndex::from_arena(&arena, upm);
    let opening_config = config.opening_config();
    let host_radius = config.to_units(config.opening_host_radius_m);
    let mut openings = Vec::with_capacity(plan.openings.len());
    for (index, o) in plan.openings.iter().enumerate() {
        if o.score < config.min_score {
            summary.low_score += 1;
            continue;
        }
        let Some(footprint) = polygon("opening", index, &o.footprint, &mut summary) else {
            continue;
        };
        let center = footprint.centroid();
        let Some(wall) = walls.nearest(&arena, center, host_radius) else {
            warn!(
                index,
                kind = o.kind.as_str(),
                x = center.x,
                y = center.y,
                "no wall to host opening"
            );
            summary.unhosted_openings += 1;
            continue;
        };
        let (center, length) = host_on_wall(&arena, wall, &footprint)?;
        openings.push(arena.add_opening(
            o.kind,
            center,
            wall,
            length,
            opening_config.default_thickness,
            o.id,
        )?);
    }

    // 5. Opening adjacency
    for &opening in &openings {
        let (a, b) = arena.resolve_adjacent_rooms(opening, opening_config.probe_clearance)?;
        if a.is_none() || b.is_none() {
            summary.one_sided_openings += 1;
        }
    }
    debug!(
        openings = openings.len(),
        one_sided = summary.one_sided_openings,
        "openings resolved"
    );

    // 6. Objects
    let anchor_config = config.anchor_config();
    for (index, o) in plan.objects.iter().enumerate() {
        if o.score < config.min_score {
            summary.low_score += 1;
            continue;
        }
        let Some(footprint) = polygon("object", index, &o.footprint, &mut summary) else {
            continue;
        };
        let object = arena.add_object(o.kind, footprint, o.id);
        arena.set_room_container(object)?;
        let outcome = arena.anchor_object(object, Some(&walls), &anchor_config)?;
        if !outcome.next_to_wall {
            summary.free_objects += 1;
        }
    }

    // 7. Subwalls
    if config.split_walls_at_junctions {
        let top_level: Vec<WallKey> = arena
            .walls()
            .filter(|(_, w)| !w.is_subwall())
            .map(|(k, _)| k)
            .collect();
        let mut subwalls = 0;
        for wall in top_level {
            subwalls += arena.split_at_junctions(wall)?.len();
        }
        debug!(subwalls, "walls split at junctions");
    }

    // 8. Room sides
    let side_config = config.side_config();
    let margin = config.to_units(config.surrounding_wall_margin_m);
    let angle_tolerance = config.angle_tolerance_deg.to_radians();
    for &(room, _) in &room_classes {
        arena.compute_surrounding_walls(room, margin, angle_tolerance)?;
        arena.linearize_room(room, &side_config)?;
    }

    // 9. Outlets
    for o in &plan.outlets {
        let position = o.position.to_nalgebra();
        let side = match arena.room_containing(&position) {
            Some(room) => arena.nearest_side(room, &position)?.map(|side| (room, side)),
            None => None,
        };
        let Some((room, side)) = side else {
            warn!(x = position.x, y = position.y, kind = ?o.kind, "outlet outside every room");
            summary.unplaced_outlets += 1;
            continue;
        };
        arena.add_outlet(
            o.kind,
            position,
            o.rotation,
            room,
            side,
            side_config.outlet_half_width,
            o.id,
        )?;
    }

    // 10. Classification
    let max_shaft_area = config.area_to_units(config.max_shaft_area_m2);
    for &(room, class_id) in &room_classes {
        let category = match class_id {
            Some(id) => arena.classify_room_from_class_id(room, id)?,
            None => arena.classify_room(room, max_shaft_area)?,
        };
        if category == RoomCategory::Undefined {
            summary.undefined_rooms += 1;
        }
    }

    // 11. Housings
    if config.group_housings {
        group_housings(&mut arena)?;
    }

    summary.walls = arena.wall_count();
    summary.nodes = arena.node_count();
    summary.rooms = arena.room_count();
    summary.openings = arena.opening_count();
    summary.objects = arena.object_count();
    summary.outlets = arena.outlet_count();
    summary.housings = arena.housing_count();
    info!(
        walls = summary.walls,
        rooms = summary.rooms,
        openings = summary.openings,
        objects = summary.objects,
        housings = summary.housings,
        "reconstruction complete"
    );

    Ok(Reconstruction { arena, summary })
}

fn polygon(
    kind: &'static str,
    index: usize,
    points: &[Point2D],
    summary: &mut ReconstructionSummary,
) -> Option<Polygon> {
    match polygon_from(points) {
        Ok(polygon) => Some(polygon),
        Err(e) => {
            warn!(kind, index, error = %e, "skipping malformed footprint");
            summary.invalid_footprints += 1;
            None
        }
    }
}

/// Center projected on the wall centerline and the footprint's extent along
/// the wall.
fn host_on_wall(arena: &PlanArena, wall: WallKey, footprint: &Polygon) -> Result<(Point2<f64>, f64)> {
    let line = arena
        .wall(wall)
        .map(|w| w.line)
        .ok_or(bimify_topology::Error::WallNotFound(wall))?;
    let dir = line
        .direction()
        .ok_or(bimify_topology::Error::DegenerateWall {
            x: line.start.x,
            y: line.start.y,
        })?;

    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in footprint.vertices() {
        let t = (*v - line.start).dot(&dir);
        min = min.min(t);
        max = max.max(t);
    }
    let center = line.closest_point(&footprint.centroid());
    Ok((center, max - min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconstructionError;
    use crate::types::{DetectedOpening, DetectedWall};
    use approx::assert_relative_eq;
    use bimify_topology::OpeningKind;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(min_x, min_y),
            Point2D::new(max_x, min_y),
            Point2D::new(max_x, max_y),
            Point2D::new(min_x, max_y),
        ]
    }

    #[test]
    fn opening_is_centered_on_its_host_wall() {
        let mut plan = DetectedPlan::new();
        plan.walls.push(DetectedWall {
            start: Point2D::new(0.0, 0.0),
            end: Point2D::new(400.0, 0.0),
            thickness: 20.0,
            footprint: Vec::new(),
            id: None,
        });
        plan.openings.push(DetectedOpening {
            kind: OpeningKind::Window,
            footprint: rect(100.0, -4.0, 190.0, 12.0),
            score: 0.9,
            id: Some(7),
        });
        let result = reconstruct(&plan, &ReconstructionConfig::default()).unwrap();
        let (_, window) = result.arena.openings().next().unwrap();
        assert_eq!(window.id, 7);
        assert_relative_eq!(window.center, Point2::new(145.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(window.length, 90.0, epsilon = 1e-9);
        assert_eq!(result.summary.one_sided_openings, 1);
    }

    #[test]
    fn far_and_weak_openings_are_skipped() {
        let mut plan = DetectedPlan::new();
        plan.walls.push(DetectedWall {
            start: Point2D::new(0.0, 0.0),
            end: Point2D::new(400.0, 0.0),
            thickness: 20.0,
            footprint: Vec::new(),
            id: None,
        });
        plan.openings.push(DetectedOpening {
            kind: OpeningKind::Door,
            footprint: rect(100.0, 300.0, 190.0, 310.0),
            score: 0.9,
            id: None,
        });
        plan.openings.push(DetectedOpening {
            kind: OpeningKind::Door,
            footprint: rect(100.0, -5.0, 190.0, 5.0),
            score: 0.1,
            id: None,
        });
        let result = reconstruct(&plan, &ReconstructionConfig::default()).unwrap();
        assert_eq!(result.summary.openings, 0);
        assert_eq!(result.summary.unhosted_openings, 1);
        assert_eq!(result.summary.low_score, 1);
    }

    #[test]
    fn degenerate_wall_aborts() {
        let mut plan = DetectedPlan::new();
        plan.walls.push(DetectedWall {
            start: Point2D::new(5.0, 5.0),
            end: Point2D::new(5.0, 5.0),
            thickness: 10.0,
            footprint: Vec::new(),
            id: None,
        });
        let err = reconstruct(&plan, &ReconstructionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ReconstructionError::Topology(bimify_topology::Error::DegenerateWall { .. })
        ));
    }

    #[test]
    fn malformed_footprints_are_skipped() {
        let mut plan = DetectedPlan::new();
        plan.walls.push(DetectedWall {
            start: Point2D::new(0.0, 0.0),
            end: Point2D::new(400.0, 0.0),
            thickness: 20.0,
            footprint: vec![Point2D::new(0.0, -10.0), Point2D::new(400.0, -10.0), Point2D::new(0.0, -10.0)],
            id: None,
        });
        plan.rooms.push(crate::types::DetectedRoom {
            boundary: vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)],
            class_id: None,
            id: None,
        });
        plan.rooms.push(crate::types::DetectedRoom {
            boundary: rect(0.0, 10.0, 400.0, 300.0),
            class_id: None,
            id: None,
        });
        plan.openings.push(DetectedOpening {
            kind: OpeningKind::Door,
            footprint: vec![Point2D::new(100.0, 0.0)],
            score: 1.0,
            id: None,
        });

        let result = reconstruct(&plan, &ReconstructionConfig::default()).unwrap();
        assert_eq!(result.summary.invalid_footprints, 3);
        assert_eq!(result.summary.walls, 1);
        assert_eq!(result.summary.rooms, 1);
        assert_eq!(result.summary.openings, 0);
        // The wall keeps the rectangle around its centerline
        let (_, wall) = result.arena.walls().next().unwrap();
        assert_relative_eq!(wall.footprint.area(), 8000.0, epsilon = 1e-9);
    }
}
