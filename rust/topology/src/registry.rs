// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-kind identifier issuing.
//!
//! Every entity carries a numeric identifier that is stable across a run and
//! unique within its kind. Identifiers can be forced (to round-trip ids coming
//! from a previous export); the counter then jumps past the forced value so
//! later automatic identifiers never reuse it.

use serde::{Deserialize, Serialize};

use crate::keys::EntityKind;

/// Identifier counters, one per [`EntityKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRegistry {
    counters: [u32; 7],
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `explicit` if given, otherwise the next free identifier, and
    /// advances the counter to `max(counter + 1, id + 1)`.
    pub fn issue(&mut self, kind: EntityKind, explicit: Option<u32>) -> u32 {
        let counter = &mut self.counters[kind as usize];
        let id = explicit.unwrap_or(*counter);
        *counter = (*counter + 1).max(id.saturating_add(1));
        id
    }

    /// The identifier the next automatic `issue` would return.
    pub fn peek(&self, kind: EntityKind) -> u32 {
        self.counters[kind as usize]
    }
}
