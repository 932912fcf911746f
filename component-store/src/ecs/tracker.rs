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
//! Composition bitmasks
//!
//! Each component type gets one bit of a 64-bit word when its container is
//! built. For every entity the tracker stores the OR of the bits of all
//! containers holding a slot for it, including slots that are logically
//! removed but not yet destroyed. Membership tests are a single AND.

use crate::ecs::Entity;
use crate::error::{StoreError, StoreResult};
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// Number of distinct component types one tracker can assign bits to
pub const MAX_COMPONENT_TYPES: u32 = u64::BITS;

/// A single-bit mask identifying one component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentBit(u64);

impl ComponentBit {
    /// Raw mask value (exactly one bit set)
    pub fn mask(&self) -> u64 {
        self.0
    }

    /// Position of the set bit, 0..64
    pub fn position(&self) -> u32 {
        self.0.trailing_zeros()
    }
}

impl fmt::Display for ComponentBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bit {}", self.position())
    }
}

/// Type to bit assignment plus per-entity composition masks
#[derive(Debug, Default)]
pub struct ComponentTracker {
    assigned: u32,
    masks: HashMap<Entity, u64>,
}

impl ComponentTracker {
    /// Create a tracker with no bits assigned
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next unused bit
    ///
    /// The first call returns bit 0 (mask 1), the next bit 1 (mask 2), and
    /// so on. Fails once all 64 bits are taken.
    pub fn get_bit(&mut self) -> StoreResult<ComponentBit> {
        if self.assigned >= MAX_COMPONENT_TYPES {
            return Err(StoreError::CapacityExceeded {
                limit: MAX_COMPONENT_TYPES,
            });
        }
        let bit = ComponentBit(1u64 << self.assigned);
        self.assigned += 1;
        debug!("ComponentTracker: assigned {}", bit);
        Ok(bit)
    }

    /// Number of bits handed out so far
    pub fn assigned_bits(&self) -> u32 {
        self.assigned
    }

    /// Add `bit` to `entity`'s mask
    pub fn set_component(&mut self, entity: Entity, bit: ComponentBit) {
        *self.masks.entry(entity).or_insert(0) |= bit.0;
    }

    /// Clear `bit` from `entity`'s mask
    ///
    /// Entities whose mask drops to zero are forgotten.
    pub fn unset_component(&mut self, entity: Entity, bit: ComponentBit) {
        if let Some(mask) = self.masks.get_mut(&entity) {
            *mask &= !bit.0;
            if *mask == 0 {
                self.masks.remove(&entity);
            }
        }
    }

    /// Whether `entity`'s mask contains `bit`
    pub fn has_component(&self, entity: Entity, bit: ComponentBit) -> bool {
        self.mask(entity) & bit.0 != 0
    }

    /// Full composition mask of `entity` (zero if unseen)
    pub fn mask(&self, entity: Entity) -> u64 {
        self.masks.get(&entity).copied().unwrap_or(0)
    }

    /// Number of entities with a non-zero mask
    pub fn tracked_entities(&self) -> usize {
        self.masks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_double() {
        let mut tracker = ComponentTracker::new();
        assert_eq!(tracker.get_bit().unwrap().mask(), 1);
        assert_eq!(tracker.get_bit().unwrap().mask(), 2);
        let third = tracker.get_bit().unwrap();
        assert_eq!(third.mask(), 4);
        assert_eq!(third.position(), 2);
        assert_eq!(tracker.assigned_bits(), 3);
    }

    #[test]
    fn test_65th_bit_fails() {
        let mut tracker = ComponentTracker::new();
        let mut last = None;
        for _ in 0..64 {
            last = Some(tracker.get_bit().unwrap());
        }
        assert_eq!(last.unwrap().mask(), 1u64 << 63);
        assert_eq!(
            tracker.get_bit().unwrap_err(),
            StoreError::CapacityExceeded { limit: 64 }
        );
    }

    #[test]
    fn test_set_and_unset() {
        let mut tracker = ComponentTracker::new();
        let a = tracker.get_bit().unwrap();
        let b = tracker.get_bit().unwrap();
        let e = Entity::new(1);

        assert!(!tracker.has_component(e, a));
        tracker.set_component(e, a);
        tracker.set_component(e, b);
        assert_eq!(tracker.mask(e), 0b11);

        tracker.unset_component(e, a);
        assert!(!tracker.has_component(e, a));
        assert!(tracker.has_component(e, b));

        tracker.unset_component(e, b);
        assert_eq!(tracker.mask(e), 0);
        assert_eq!(tracker.tracked_entities(), 0);
    }

    #[test]
    fn test_unset_unseen_entity_is_noop() {
        let mut tracker = ComponentTracker::new();
        let a = tracker.get_bit().unwrap();
        tracker.unset_component(Entity::new(9), a);
        assert_eq!(tracker.tracked_entities(), 0);
    }
}
