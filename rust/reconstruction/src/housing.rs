// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping rooms into dwelling units.

use bimify_topology::{HousingKey, OpeningKind, PlanArena, RoomKey};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;

/// Creates one housing per group of rooms reachable through doors.
///
/// Common areas (shafts, exterior, access, stairs, elevators) never join a
/// housing and do not link the rooms around them. Groups are seeded in room
/// storage order; rooms already in a housing are left alone.
pub fn group_housings(arena: &mut PlanArena) -> Result<Vec<HousingKey>> {
    let rooms: Vec<RoomKey> = arena
        .rooms()
        .filter(|(_, r)| !r.category.is_common_area() && r.housing.is_none())
        .map(|(k, _)| k)
        .collect();
    let eligible: FxHashSet<RoomKey> = rooms.iter().copied().collect();

    let mut neighbours: FxHashMap<RoomKey, Vec<RoomKey>> = FxHashMap::default();
    for (_, opening) in arena.openings() {
        if opening.kind != OpeningKind::Door {
            continue;
        }
        if let (Some(a), Some(b)) = opening.rooms {
            if a != b && eligible.contains(&a) && eligible.contains(&b) {
                neighbours.entry(a).or_default().push(b);
                neighbours.entry(b).or_default().push(a);
            }
        }
    }

    let mut visited = FxHashSet::default();
    let mut housings = Vec::new();
    for &seed in &rooms {
        if !visited.insert(seed) {
            continue;
        }
        let mut members = vec![seed];
        let mut stack = vec![seed];
        while let Some(room) = stack.pop() {
            for &next in neighbours.get(&room).into_iter().flatten() {
                if visited.insert(next) {
                    members.push(next);
                    stack.push(next);
                }
            }
        }

        let housing = arena.add_housing(None);
        for room in members {
            arena.add_room_to_housing(housing, room)?;
        }
        housings.push(housing);
    }

    tracing::debug!(housings = housings.len(), rooms = rooms.len(), "grouped housings");
    Ok(housings)
}
