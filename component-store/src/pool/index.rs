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
//! Entity to slot index
//!
//! A sorted vector searched by binary search. Lookups are O(log n) and
//! inserts shift the tail, but the records stay in one contiguous block,
//! which beats a hash map for the pool sizes this engine sees.

use crate::ecs::Entity;
use crate::error::{StoreError, StoreResult};

/// Maps each tracked entity to its dense slot index
///
/// Records are kept sorted by entity id. Correctness does not depend on
/// the order entities are inserted or removed in.
#[derive(Debug, Clone, Default)]
pub struct IndexTracker {
    records: Vec<(Entity, usize)>,
}

impl IndexTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        IndexTracker {
            records: Vec::with_capacity(capacity),
        }
    }

    fn search(&self, entity: Entity) -> Result<usize, usize> {
        self.records.binary_search_by_key(&entity, |&(e, _)| e)
    }

    /// Record `index` for `entity`, overwriting any previous index
    pub fn insert_or_update(&mut self, entity: Entity, index: usize) {
        match self.search(entity) {
            Ok(pos) => self.records[pos].1 = index,
            Err(pos) => self.records.insert(pos, (entity, index)),
        }
    }

    /// Drop the record for `entity` and return the index it held
    pub fn remove(&mut self, entity: Entity) -> StoreResult<usize> {
        match self.search(entity) {
            Ok(pos) => Ok(self.records.remove(pos).1),
            Err(_) => Err(StoreError::NotFound { entity }),
        }
    }

    /// Slot index recorded for `entity`
    pub fn get(&self, entity: Entity) -> StoreResult<usize> {
        self.search(entity)
            .map(|pos| self.records[pos].1)
            .map_err(|_| StoreError::NotFound { entity })
    }

    /// Whether `entity` has a record
    pub fn contains(&self, entity: Entity) -> bool {
        self.search(entity).is_ok()
    }

    /// Make sure the tracker can hold `capacity` records without reallocating
    ///
    /// Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.records.capacity() {
            self.records.reserve_exact(capacity - self.records.len());
        }
    }

    /// Shrink the backing storage to fit `capacity` records
    pub(crate) fn shrink_to(&mut self, capacity: usize) {
        self.records.shrink_to(capacity);
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no entity is tracked
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Allocated record capacity
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Forget every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Iterate `(entity, index)` records in entity order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, usize)> + '_ {
        self.records.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_sorted_order() {
        let mut tracker = IndexTracker::new();
        tracker.insert_or_update(Entity::new(5), 0);
        tracker.insert_or_update(Entity::new(1), 1);
        tracker.insert_or_update(Entity::new(3), 2);

        let ids: Vec<u64> = tracker.iter().map(|(e, _)| e.id()).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(tracker.get(Entity::new(3)), Ok(2));
    }

    #[test]
    fn test_update_overwrites_index() {
        let mut tracker = IndexTracker::new();
        tracker.insert_or_update(Entity::new(2), 4);
        tracker.insert_or_update(Entity::new(2), 9);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get(Entity::new(2)), Ok(9));
    }

    #[test]
    fn test_remove_returns_index() {
        let mut tracker = IndexTracker::new();
        tracker.insert_or_update(Entity::new(2), 4);
        tracker.insert_or_update(Entity::new(8), 1);

        assert_eq!(tracker.remove(Entity::new(2)), Ok(4));
        assert!(!tracker.contains(Entity::new(2)));
        assert!(tracker.contains(Entity::new(8)));
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let mut tracker = IndexTracker::new();
        let ghost = Entity::new(77);
        assert_eq!(tracker.get(ghost), Err(StoreError::NotFound { entity: ghost }));
        assert_eq!(tracker.remove(ghost), Err(StoreError::NotFound { entity: ghost }));
    }

    #[test]
    fn test_reserve_only_grows() {
        let mut tracker = IndexTracker::with_capacity(16);
        tracker.reserve(4);
        assert!(tracker.capacity() >= 16);
        tracker.reserve(64);
        assert!(tracker.capacity() >= 64);
    }
}
