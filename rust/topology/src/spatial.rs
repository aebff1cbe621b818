// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid-based spatial hashes for node merging and wall lookup.
//!
//! [`NodeIndex`] answers "is there already a node within tolerance of this
//! point" so junctions found from different wall pairs collapse onto one
//! node. [`WallIndex`] buckets wall footprint bounds so anchoring and
//! opening hosting only look at walls near the query region.

use bimify_geometry::{Bounds2D, Point2};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::PlanArena;
use crate::keys::{NodeKey, WallKey};

type Cell = (i64, i64);

fn cell_of(cell_size: f64, x: f64, y: f64) -> Cell {
    ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}

/// A spatial hash over node positions.
///
/// Lookups check the 3x3 neighborhood around the query cell, so the
/// tolerance should be <= `cell_size`.
#[derive(Debug)]
pub struct NodeIndex {
    cell_size: f64,
    grid: FxHashMap<Cell, Vec<NodeKey>>,
}

impl NodeIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            grid: FxHashMap::default(),
        }
    }

    /// Builds an index from all nodes in an arena.
    pub fn from_arena(arena: &PlanArena, cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        for (key, data) in arena.nodes.iter() {
            index.insert(key, data.position);
        }
        index
    }

    pub fn insert(&mut self, key: NodeKey, position: Point2<f64>) {
        let cell = cell_of(self.cell_size, position.x, position.y);
        self.grid.entry(cell).or_default().push(key);
    }

    /// Finds a node within `tolerance` of `position`, first match wins.
    pub fn find_near(
        &self,
        arena: &PlanArena,
        position: Point2<f64>,
        tolerance: f64,
    ) -> Option<NodeKey> {
        let (cx, cy) = cell_of(self.cell_size, position.x, position.y);
        let tol_sq = tolerance * tolerance;

        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(keys) = self.grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &nk in keys {
                    if let Some(n) = arena.node(nk) {
                        if (n.position - position).norm_squared() <= tol_sq {
                            return Some(nk);
                        }
                    }
                }
            }
        }
        None
    }
}

/// A spatial hash over wall footprint bounds.
///
/// Each wall is registered in every cell its footprint bounds overlap.
#[derive(Debug)]
pub struct WallIndex {
    cell_size: f64,
    grid: FxHashMap<Cell, Vec<WallKey>>,
}

impl WallIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            grid: FxHashMap::default(),
        }
    }

    /// Indexes every top-level wall and extension of the arena.
    ///
    /// Subwalls are skipped: they cover the same footprint as their parent.
    pub fn from_arena(arena: &PlanArena, cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        for (key, wall) in arena.walls.iter().filter(|(_, w)| !w.is_subwall()) {
            index.insert(key, &wall.footprint.bounds());
        }
        tracing::debug!(walls = arena.wall_count(), cells = index.grid.len(), "built wall index");
        index
    }

    pub fn insert(&mut self, key: WallKey, bounds: &Bounds2D) {
        let (x0, y0) = cell_of(self.cell_size, bounds.min_x, bounds.min_y);
        let (x1, y1) = cell_of(self.cell_size, bounds.max_x, bounds.max_y);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.grid.entry((cx, cy)).or_default().push(key);
            }
        }
    }

    /// Walls whose footprint bounds intersect `bounds`, sorted by key.
    pub fn query(&self, arena: &PlanArena, bounds: &Bounds2D) -> Vec<WallKey> {
        let (x0, y0) = cell_of(self.cell_size, bounds.min_x, bounds.min_y);
        let (x1, y1) = cell_of(self.cell_size, bounds.max_x, bounds.max_y);

        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                let Some(keys) = self.grid.get(&(cx, cy)) else {
                    continue;
                };
                for &wk in keys {
                    if !seen.insert(wk) {
                        continue;
                    }
                    let hit = arena
                        .wall(wk)
                        .is_some_and(|w| w.footprint.bounds().intersects(bounds));
                    if hit {
                        result.push(wk);
                    }
                }
            }
        }
        result.sort();
        result
    }

    /// The wall whose centerline is nearest to `point`, searching within
    /// `radius`.
    pub fn nearest(&self, arena: &PlanArena, point: Point2<f64>, radius: f64) -> Option<WallKey> {
        let search = Bounds2D::new(point.x, point.y, point.x, point.y).expanded(radius);
        let mut best: Option<(WallKey, f64)> = None;
        for wk in self.query(arena, &search) {
            let Some(wall) = arena.wall(wk) else { continue };
            let d = wall.line.distance_to_point(&point);
            if d <= radius && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((wk, d));
            }
        }
        best.map(|(k, _)| k)
    }
}

impl PlanArena {
    /// Returns an existing node within `tolerance` of `position`, or creates
    /// a new one and registers it in `index`.
    pub fn find_or_add_node(
        &mut self,
        index: &mut NodeIndex,
        position: Point2<f64>,
        tolerance: f64,
    ) -> NodeKey {
        if let Some(existing) = index.find_near(self, position, tolerance) {
            return existing;
        }
        let key = self.add_node(position, None);
        index.insert(key, position);
        key
    }
}
