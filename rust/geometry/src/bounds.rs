// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned 2D bounding boxes

use nalgebra::Point2;

/// Axis-aligned bounding box in plan coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds2D {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box holding every point. `None` for an empty slice.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn intersects(&self, other: &Bounds2D) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains_point(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = Bounds2D::from_points(&[
            Point2::new(3.0, -1.0),
            Point2::new(-2.0, 4.0),
            Point2::new(1.0, 1.0),
        ])
        .unwrap();
        assert_eq!(bounds, Bounds2D::new(-2.0, -1.0, 3.0, 4.0));
        assert!(Bounds2D::from_points(&[]).is_none());
    }

    #[test]
    fn test_intersects_and_expand() {
        let a = Bounds2D::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds2D::new(12.0, 0.0, 20.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.expanded(2.0).intersects(&b));
        assert_eq!(a.width(), 10.0);
        assert!(a.contains_point(&Point2::new(10.0, 5.0)));
    }
}
