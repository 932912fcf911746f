// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Entity keys
//!
//! An entity is nothing but an integer key. It owns no data and has no
//! record of its own; its existence is the union of the pools that hold a
//! slot keyed by it.

use std::fmt;

/// Opaque entity key
///
/// Equality and ordering follow the raw id, which is what the pool index
/// trackers sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Create an entity from a raw id
    pub const fn new(id: u64) -> Self {
        Entity(id)
    }

    /// Get the raw id
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Entity {
    fn from(id: u64) -> Self {
        Entity(id)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out fresh entity keys
///
/// Ids increase monotonically and are never reused, so a key that was fully
/// removed from every pool can't alias a newer entity.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Create an allocator starting at id 0
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an allocator whose first key is `first_id`
    pub fn starting_at(first_id: u64) -> Self {
        EntityAllocator { next_id: first_id }
    }

    /// Allocate a new entity key
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next_id);
        self.next_id += 1;
        entity
    }

    /// Number of keys handed out so far (relative to id 0)
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}
