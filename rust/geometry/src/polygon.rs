// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simple polygons: area, containment, offsetting and segment clipping
//!
//! Polygons are stored as an open ring (the closing vertex is implicit).
//! Containment is strict: points on the boundary are not contained, which
//! matches the usual GIS `contains` predicate.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::float::clip::FloatClip;
use i_overlay::mesh::outline::offset::OutlineOffset;
use i_overlay::mesh::style::{LineJoin, OutlineStyle};
use i_overlay::string::clip::ClipRule;
use nalgebra::{Point2, Vector2};

use crate::bounds::Bounds2D;
use crate::error::{Error, Result};
use crate::segment::{Segment, EPSILON};

/// Distance under which a point is considered to lie on a polygon boundary
const BOUNDARY_TOLERANCE: f64 = 1e-7;

/// Corners sharper than this (radians) are beveled when offsetting
const MIN_MITRE_ANGLE: f64 = 0.25;

/// Clipped pieces closer than this along the segment are merged, and a
/// piece shorter than this is a touching point
const CLIP_TOLERANCE: f64 = 1e-6;

/// Simple polygon with at least three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2<f64>>,
}

/// Result of clipping a segment with a polygon
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentClip {
    Empty,
    /// The segment only touches the polygon at one point
    Point(Point2<f64>),
    /// The part of the segment inside the polygon is a single piece
    Segment(Segment),
    /// Several disjoint pieces
    Multiple,
}

impl Polygon {
    /// Build a polygon from its vertices. A repeated closing vertex is dropped.
    pub fn new(mut vertices: Vec<Point2<f64>>) -> Result<Self> {
        if vertices.len() > 1 {
            let first = vertices[0];
            let last = vertices[vertices.len() - 1];
            if (first - last).norm() < EPSILON {
                vertices.pop();
            }
        }
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Axis-aligned rectangle between two corners
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        Self::from_coords(&[(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)])
    }

    /// Rectangle of the given thickness centered on `centerline`.
    ///
    /// Vertex order is `[start+n, end+n, end-n, start-n]` with `n` the left
    /// normal scaled to half the thickness, so edges 0 and 2 are the two long
    /// faces running along the centerline.
    pub fn from_centerline(centerline: &Segment, thickness: f64) -> Result<Self> {
        let dir = centerline.direction().ok_or(Error::DegenerateSegment {
            x: centerline.start.x,
            y: centerline.start.y,
        })?;
        let n = Vector2::new(-dir.y, dir.x) * (thickness / 2.0);
        Self::new(vec![
            centerline.start + n,
            centerline.end + n,
            centerline.end - n,
            centerline.start - n,
        ])
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping).
    pub fn edge(&self, i: usize) -> Segment {
        let n = self.vertices.len();
        Segment::new(self.vertices[i % n], self.vertices[(i + 1) % n])
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.vertices.len()).map(move |i| self.edge(i))
    }

    pub fn edge_lengths(&self) -> Vec<f64> {
        self.edges().map(|e| e.length()).collect()
    }

    /// Shoelace area, positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Area-weighted centroid. Falls back to the vertex average for rings
    /// with no area.
    pub fn centroid(&self) -> Point2<f64> {
        let n = self.vertices.len();
        let signed = self.signed_area();
        if signed.abs() < EPSILON {
            let sum = self
                .vertices
                .iter()
                .fold(Vector2::zeros(), |acc, p| acc + p.coords);
            return Point2::from(sum / n as f64);
        }

        // Shift to the first vertex to keep the sums well conditioned
        let origin = self.vertices[0];
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let a = self.vertices[i] - origin;
            let b = self.vertices[(i + 1) % n] - origin;
            let f = a.x * b.y - b.x * a.y;
            cx += (a.x + b.x) * f;
            cy += (a.y + b.y) * f;
        }
        let k = 1.0 / (6.0 * signed);
        Point2::new(origin.x + cx * k, origin.y + cy * k)
    }

    pub fn bounds(&self) -> Bounds2D {
        let mut bounds = Bounds2D::new(
            self.vertices[0].x,
            self.vertices[0].y,
            self.vertices[0].x,
            self.vertices[0].y,
        );
        for p in &self.vertices[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        bounds
    }

    pub fn translated(&self, offset: &Vector2<f64>) -> Polygon {
        Polygon {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
        }
    }

    /// Distance from `point` to the nearest boundary edge.
    pub fn boundary_distance(&self, point: &Point2<f64>) -> f64 {
        self.edges()
            .map(|e| e.distance_to_point(point))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn on_boundary(&self, point: &Point2<f64>) -> bool {
        self.boundary_distance(point) < BOUNDARY_TOLERANCE
    }

    /// Strict interior containment (even-odd ray casting).
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        if self.on_boundary(point) {
            return false;
        }
        self.winds_around(point)
    }

    /// Containment including the boundary.
    pub fn covers(&self, point: &Point2<f64>) -> bool {
        self.on_boundary(point) || self.winds_around(point)
    }

    fn winds_around(&self, point: &Point2<f64>) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.vertices[i];
            let vj = &self.vertices[j];
            if (vi.y > point.y) != (vj.y > point.y) {
                let x_cross = vj.x + (point.y - vj.y) * (vi.x - vj.x) / (vi.y - vj.y);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Ring as an `i_overlay` contour, counter-clockwise.
    fn contour(&self) -> Vec<[f64; 2]> {
        let mut contour: Vec<[f64; 2]> = self.vertices.iter().map(|p| [p.x, p.y]).collect();
        if !self.is_counter_clockwise() {
            contour.reverse();
        }
        contour
    }

    /// Outward offset by `distance` with mitred corners.
    ///
    /// Returns the polygon unchanged when the offset leaves nothing.
    pub fn buffer(&self, distance: f64) -> Polygon {
        let style = OutlineStyle::new(distance).line_join(LineJoin::Miter(MIN_MITRE_ANGLE));
        let shapes = vec![self.contour()].outline(style);
        shapes
            .into_iter()
            .next()
            .and_then(|shape| shape.into_iter().next())
            .and_then(|outer| Polygon::new(outer.into_iter().map(|[x, y]| Point2::new(x, y)).collect()).ok())
            .unwrap_or_else(|| self.clone())
    }

    /// Intersection of the closed polygon with `segment`.
    ///
    /// Pieces running along the boundary count as inside.
    pub fn clip_segment(&self, segment: &Segment) -> SegmentClip {
        let Some(dir) = segment.direction() else {
            return if self.covers(&segment.start) {
                SegmentClip::Point(segment.start)
            } else {
                SegmentClip::Empty
            };
        };

        let line = vec![
            [segment.start.x, segment.start.y],
            [segment.end.x, segment.end.y],
        ];
        let rule = ClipRule {
            invert: false,
            boundary_included: true,
        };
        let paths = line.clip_by(&self.contour(), FillRule::NonZero, rule);

        // Each piece as a run of distances along the segment
        let mut runs: Vec<(f64, f64)> = paths
            .iter()
            .filter(|path| !path.is_empty())
            .map(|path| {
                path.iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &[x, y]| {
                        let t = (Point2::new(x, y) - segment.start).dot(&dir);
                        (lo.min(t), hi.max(t))
                    })
            })
            .collect();
        runs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(runs.len());
        for (lo, hi) in runs {
            match merged.last_mut() {
                Some(last) if lo <= last.1 + CLIP_TOLERANCE => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }

        match merged.as_slice() {
            [] => SegmentClip::Empty,
            &[(lo, hi)] => {
                let len = segment.length();
                let (lo, hi) = (lo.clamp(0.0, len), hi.clamp(0.0, len));
                if hi - lo < CLIP_TOLERANCE {
                    SegmentClip::Point(segment.point_at(lo))
                } else {
                    SegmentClip::Segment(Segment::new(segment.point_at(lo), segment.point_at(hi)))
                }
            }
            _ => SegmentClip::Multiple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        Polygon::rectangle(0.0, 0.0, size, size).unwrap()
    }

    #[test]
    fn test_too_few_vertices() {
        let err = Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]).unwrap_err();
        assert_eq!(err, Error::TooFewVertices(2));
    }

    #[test]
    fn test_area_and_centroid() {
        let p = Polygon::rectangle(0.0, 0.0, 4.0, 2.0).unwrap();
        assert_relative_eq!(p.area(), 8.0);
        let c = p.centroid();
        assert_relative_eq!(c.x, 2.0);
        assert_relative_eq!(c.y, 1.0);

        // L-shape: centroid is area-weighted, not the vertex average
        let l = Polygon::from_coords(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ])
        .unwrap();
        assert_relative_eq!(l.area(), 7.0);
        let c = l.centroid();
        assert_relative_eq!(c.x, c.y, epsilon = 1e-12);
        assert_relative_eq!(c.x, (4.0 * 2.0 + 3.0 * 0.5) / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_contains_is_strict() {
        let p = square(10.0);
        assert!(p.contains(&Point2::new(5.0, 5.0)));
        assert!(!p.contains(&Point2::new(10.0, 5.0)));
        assert!(p.covers(&Point2::new(10.0, 5.0)));
        assert!(!p.contains(&Point2::new(11.0, 5.0)));
    }

    #[test]
    fn test_from_centerline_faces() {
        let line = Segment::from_coords(0.0, 0.0, 10.0, 0.0);
        let p = Polygon::from_centerline(&line, 2.0).unwrap();
        assert_relative_eq!(p.area(), 20.0);
        assert_relative_eq!(p.edge(0).start.y, 1.0);
        assert_relative_eq!(p.edge(2).start.y, -1.0);
        assert!(Polygon::from_centerline(&Segment::from_coords(1.0, 1.0, 1.0, 1.0), 2.0).is_err());
    }

    #[test]
    fn test_buffer_square() {
        let b = square(10.0).buffer(1.0);
        let bounds = b.bounds();
        assert_relative_eq!(bounds.min_x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(bounds.max_y, 11.0, epsilon = 1e-6);
        assert_relative_eq!(b.area(), 144.0, epsilon = 1e-4);

        // Same result for a clockwise ring
        let cw = Polygon::from_coords(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)])
            .unwrap()
            .buffer(1.0);
        assert_relative_eq!(cw.area(), 144.0, epsilon = 1e-4);
    }

    #[test]
    fn test_clip_segment_through() {
        let p = square(10.0);
        let s = Segment::from_coords(-5.0, 5.0, 15.0, 5.0);
        match p.clip_segment(&s) {
            SegmentClip::Segment(piece) => {
                assert_relative_eq!(piece.start.x, 0.0, epsilon = 1e-6);
                assert_relative_eq!(piece.end.x, 10.0, epsilon = 1e-6);
            }
            other => panic!("expected segment, got {:?}", other),
        }
    }

    #[test]
    fn test_clip_segment_along_edge() {
        let p = square(10.0);
        let s = Segment::from_coords(-5.0, 0.0, 5.0, 0.0);
        match p.clip_segment(&s) {
            SegmentClip::Segment(piece) => {
                assert_relative_eq!(piece.start.x, 0.0, epsilon = 1e-6);
                assert_relative_eq!(piece.end.x, 5.0, epsilon = 1e-6);
            }
            other => panic!("expected segment, got {:?}", other),
        }
    }

    #[test]
    fn test_clip_segment_touching_corner() {
        let p = square(10.0);
        let s = Segment::from_coords(10.0, 10.0, 20.0, 20.0);
        assert!(!matches!(p.clip_segment(&s), SegmentClip::Segment(_)));
        let miss = Segment::from_coords(20.0, 0.0, 20.0, 10.0);
        assert_eq!(p.clip_segment(&miss), SegmentClip::Empty);
    }

    #[test]
    fn test_clip_segment_multiple_pieces() {
        // U-shaped polygon crossed through both arms
        let u = Polygon::from_coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (7.0, 10.0),
            (7.0, 3.0),
            (3.0, 3.0),
            (3.0, 10.0),
            (0.0, 10.0),
        ])
        .unwrap();
        let s = Segment::from_coords(-1.0, 5.0, 11.0, 5.0);
        assert_eq!(u.clip_segment(&s), SegmentClip::Multiple);
    }
}
