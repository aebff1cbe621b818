// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line segments and segment/segment intersection

use nalgebra::{Point2, Vector2};

/// Epsilon for parameter and cross-product comparisons
pub(crate) const EPSILON: f64 = 1e-9;

/// 2D cross product (z component of the 3D cross product)
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Straight segment from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

/// Result of intersecting two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    None,
    Point(Point2<f64>),
    /// Collinear segments sharing a stretch of non-zero length
    Overlap(Segment),
}

impl Segment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point2::new(x1, y1), Point2::new(x2, y2))
    }

    pub fn vector(&self) -> Vector2<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < EPSILON
    }

    /// Unit direction, `None` for a zero-length segment.
    pub fn direction(&self) -> Option<Vector2<f64>> {
        let v = self.vector();
        let len = v.norm();
        (len >= EPSILON).then(|| v / len)
    }

    /// Oriented angle of the segment in radians, in `(-π, π]`.
    pub fn angle(&self) -> f64 {
        let v = self.vector();
        v.y.atan2(v.x)
    }

    pub fn midpoint(&self) -> Point2<f64> {
        Point2::from((self.start.coords + self.end.coords) / 2.0)
    }

    pub fn reversed(&self) -> Segment {
        Segment::new(self.end, self.start)
    }

    pub fn translated(&self, offset: &Vector2<f64>) -> Segment {
        Segment::new(self.start + offset, self.end + offset)
    }

    /// Point at `offset` distance from the start along the supporting line.
    /// The offset is not clamped, so negative values and values past the end
    /// land on the line extension.
    pub fn point_at(&self, offset: f64) -> Point2<f64> {
        match self.direction() {
            Some(dir) => self.start + dir * offset,
            None => self.start,
        }
    }

    /// Point at `offset` from the start, or `None` outside `[0, length]`.
    pub fn interpolate(&self, offset: f64) -> Option<Point2<f64>> {
        if offset < 0.0 || offset > self.length() {
            return None;
        }
        Some(self.point_at(offset))
    }

    /// Distance from the start to the orthogonal projection of `point`,
    /// clamped to `[0, length]`.
    pub fn project(&self, point: &Point2<f64>) -> f64 {
        let len = self.length();
        if len < EPSILON {
            return 0.0;
        }
        let t = (point - self.start).dot(&self.vector()) / len;
        t.clamp(0.0, len)
    }

    pub fn closest_point(&self, point: &Point2<f64>) -> Point2<f64> {
        self.point_at(self.project(point))
    }

    pub fn distance_to_point(&self, point: &Point2<f64>) -> f64 {
        (point - self.closest_point(point)).norm()
    }

    /// Parallel copy shifted by `distance` along the left normal.
    pub fn offset(&self, distance: f64) -> Segment {
        match self.direction() {
            Some(dir) => {
                let normal = Vector2::new(-dir.y, dir.x);
                self.translated(&(normal * distance))
            }
            None => *self,
        }
    }

    /// Intersection of the two supporting lines, expressed as distances from
    /// each segment's start along its own direction. `None` when parallel.
    pub fn line_intersection_params(&self, other: &Segment) -> Option<(f64, f64)> {
        let da = self.direction()?;
        let db = other.direction()?;
        let denom = cross(&da, &db);
        if denom.abs() < EPSILON {
            return None;
        }
        let qp = other.start - self.start;
        let s = cross(&qp, &db) / denom;
        let t = cross(&qp, &da) / denom;
        Some((s, t))
    }

    /// Intersection of two closed segments.
    pub fn intersection(&self, other: &Segment) -> SegmentIntersection {
        let r = self.vector();
        let s = other.vector();
        let qp = other.start - self.start;
        let rr = r.dot(&r);
        let ss = s.dot(&s);

        if rr < EPSILON * EPSILON || ss < EPSILON * EPSILON {
            return self.degenerate_intersection(other);
        }

        let denom = cross(&r, &s);
        let scale = rr.sqrt() * ss.sqrt();

        if denom.abs() <= EPSILON * scale {
            // Parallel: only collinear segments can meet
            if cross(&qp, &r).abs() > EPSILON * rr.sqrt().max(1.0) * rr.sqrt() {
                return SegmentIntersection::None;
            }
            let t0 = qp.dot(&r) / rr;
            let t1 = t0 + s.dot(&r) / rr;
            let lo = t0.min(t1).max(0.0);
            let hi = t0.max(t1).min(1.0);
            if hi < lo - EPSILON {
                return SegmentIntersection::None;
            }
            let a = self.start + r * lo;
            let b = self.start + r * hi.max(lo);
            if (b - a).norm() < EPSILON {
                return SegmentIntersection::Point(a);
            }
            return SegmentIntersection::Overlap(Segment::new(a, b));
        }

        let t = cross(&qp, &s) / denom;
        let u = cross(&qp, &r) / denom;
        if (-EPSILON..=1.0 + EPSILON).contains(&t) && (-EPSILON..=1.0 + EPSILON).contains(&u) {
            SegmentIntersection::Point(self.start + r * t.clamp(0.0, 1.0))
        } else {
            SegmentIntersection::None
        }
    }

    fn degenerate_intersection(&self, other: &Segment) -> SegmentIntersection {
        let (point, seg) = if self.is_degenerate() {
            (self.start, other)
        } else {
            (other.start, self)
        };
        if seg.distance_to_point(&point) < EPSILON {
            SegmentIntersection::Point(point)
        } else {
            SegmentIntersection::None
        }
    }
}
