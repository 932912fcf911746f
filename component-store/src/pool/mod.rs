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
//! Dense component pools
//!
//! A [`ComponentPool`] stores every component of one type in a single
//! contiguous array of [`Component`] slots and keeps an [`IndexTracker`]
//! from entity to slot index. The occupied slots are always the prefix
//! `[0, count)`: destroying a slot moves the last occupied slot into the
//! hole, so iteration never skips gaps.
//!
//! # Memory Layout
//!
//! ```text
//! slots:   [ (v0, e7, lc) | (v1, e2, lc) | (v2, e9, lc) | ..free.. ]
//!            0              1              2              count..capacity
//! tracker: [ (e2 -> 1), (e7 -> 0), (e9 -> 2) ]   sorted by entity
//! ```
//!
//! Because destruction relocates one other slot, slot indices are not stable
//! across destructions. Code that must remember a slot across frames keeps a
//! [`SlotHandle`], which detects that it went stale instead of silently
//! pointing at another entity.

mod index;

pub use index::IndexTracker;

use crate::ecs::{Component, Entity};
use crate::error::{StoreError, StoreResult};
use log::debug;
use std::ops::{Index, IndexMut};

/// Configuration for pool capacity management
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Capacity allocated when the pool is created
    pub initial_capacity: usize,
    /// Floor for growth and trimming
    pub min_capacity: usize,
    /// Growth factor when the pool is full (e.g., 2.0 for doubling)
    pub growth_factor: f64,
    /// Whether to log when the pool grows or shrinks
    pub log_resize_events: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            initial_capacity: 64,
            min_capacity: 4,
            growth_factor: 2.0,
            log_resize_events: false,
        }
    }
}

impl PoolConfig {
    /// Create a pool configuration with custom capacities
    pub fn new(initial_capacity: usize, min_capacity: usize) -> Self {
        assert!(min_capacity > 0, "Minimum capacity must be at least 1");
        PoolConfig {
            initial_capacity,
            min_capacity,
            growth_factor: 2.0,
            log_resize_events: false,
        }
    }

    /// Enable logging for resize events
    pub fn with_logging(mut self) -> Self {
        self.log_resize_events = true;
        self
    }

    /// Set the growth factor used when the pool is full
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        assert!(factor > 1.0 && factor.is_finite(), "Growth factor must be > 1.0");
        self.growth_factor = factor;
        self
    }

    fn grown(&self, capacity: usize) -> usize {
        let scaled = (capacity as f64 * self.growth_factor).ceil() as usize;
        scaled.max(self.min_capacity).max(capacity + 1)
    }
}

/// Counters for monitoring pool churn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of slots ever created
    pub created: usize,
    /// Number of slots ever destroyed
    pub destroyed: usize,
    /// Number of capacity changes (growth, explicit resize, trim)
    pub resize_count: usize,
    /// Highest occupied count observed
    pub peak_count: usize,
}

/// Remembers where an entity's slot was
///
/// Resolving a handle checks that the slot still belongs to the entity, so
/// a handle taken before a swap-removal fails with
/// [`StoreError::StaleHandle`] rather than reaching another entity's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHandle {
    entity: Entity,
    index: usize,
}

impl SlotHandle {
    /// Entity the handle was taken for
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Slot index at the time the handle was taken
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Dense, growable storage for one component type
pub struct ComponentPool<T> {
    slots: Vec<Component<T>>,
    tracker: IndexTracker,
    capacity: usize,
    config: PoolConfig,
    stats: PoolStats,
}

impl<T> ComponentPool<T> {
    /// Create a pool with the default configuration
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool with room for `capacity` components
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(PoolConfig {
            initial_capacity: capacity,
            ..PoolConfig::default()
        })
    }

    /// Create a pool with a custom configuration
    pub fn with_config(config: PoolConfig) -> Self {
        let capacity = config.initial_capacity;
        ComponentPool {
            slots: Vec::with_capacity(capacity),
            tracker: IndexTracker::with_capacity(capacity),
            capacity,
            config,
            stats: PoolStats::default(),
        }
    }

    /// Number of occupied slots
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots the pool can hold before growing
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Churn counters
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Entity to slot index mapping
    pub fn index_tracker(&self) -> &IndexTracker {
        &self.tracker
    }

    /// Whether `entity` has a slot in this pool
    pub fn contains(&self, entity: Entity) -> bool {
        self.tracker.contains(entity)
    }

    /// Slot index currently holding `entity`
    pub fn index_of(&self, entity: Entity) -> StoreResult<usize> {
        self.tracker.get(entity)
    }

    /// Occupied slots, `[0, count)`
    pub fn slots(&self) -> &[Component<T>] {
        &self.slots
    }

    /// Mutable occupied slots
    ///
    /// Slot entities can't be changed through this; only payloads and
    /// lifecycles.
    pub fn slots_mut(&mut self) -> &mut [Component<T>] {
        &mut self.slots
    }

    /// Entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().map(Component::entity)
    }

    /// Create a slot for `entity` with a default payload
    pub fn create_for(&mut self, entity: Entity) -> StoreResult<&mut T>
    where
        T: Default,
    {
        self.insert_for(entity, T::default())
    }

    /// Create a slot for `entity` holding `value`
    ///
    /// Grows the pool when it is full. The new slot starts in the `New`
    /// state.
    pub fn insert_for(&mut self, entity: Entity, value: T) -> StoreResult<&mut T> {
        if self.tracker.contains(entity) {
            return Err(StoreError::AlreadyPresent { entity });
        }
        if self.slots.len() == self.capacity {
            let grown = self.config.grown(self.capacity);
            self.grow_to(grown);
        }

        let index = self.slots.len();
        self.slots.push(Component::new(entity, value));
        self.tracker.insert_or_update(entity, index);

        self.stats.created += 1;
        self.stats.peak_count = self.stats.peak_count.max(self.slots.len());
        debug_assert_eq!(self.tracker.len(), self.slots.len());

        Ok(&mut self.slots[index].value)
    }

    /// Destroy the slot at `index`
    ///
    /// The last occupied slot is moved into `index`, so any slot index or
    /// handle held for that other entity is invalidated.
    pub fn destroy(&mut self, index: usize) -> StoreResult<Component<T>> {
        let count = self.slots.len();
        if index >= count {
            return Err(StoreError::IndexOutOfRange { index, count });
        }

        let entity = self.slots[index].entity();
        self.tracker.remove(entity)?;

        let destroyed = self.slots.swap_remove(index);
        if index < self.slots.len() {
            let moved = self.slots[index].entity();
            self.tracker.insert_or_update(moved, index);
        }

        self.stats.destroyed += 1;
        debug_assert_eq!(self.tracker.len(), self.slots.len());

        Ok(destroyed)
    }

    /// Destroy the slot owned by `entity`
    pub fn destroy_for(&mut self, entity: Entity) -> StoreResult<Component<T>> {
        let index = self.tracker.get(entity)?;
        self.destroy(index)
    }

    /// Slot owned by `entity`
    pub fn get(&self, entity: Entity) -> StoreResult<&Component<T>> {
        let index = self.tracker.get(entity)?;
        Ok(&self.slots[index])
    }

    /// Mutable slot owned by `entity`
    pub fn get_mut(&mut self, entity: Entity) -> StoreResult<&mut Component<T>> {
        let index = self.tracker.get(entity)?;
        Ok(&mut self.slots[index])
    }

    /// Slot at `index`
    pub fn get_at(&self, index: usize) -> StoreResult<&Component<T>> {
        let count = self.slots.len();
        self.slots
            .get(index)
            .ok_or(StoreError::IndexOutOfRange { index, count })
    }

    /// Mutable slot at `index`
    pub fn get_at_mut(&mut self, index: usize) -> StoreResult<&mut Component<T>> {
        let count = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, count })
    }

    /// Take a handle to `entity`'s current slot
    pub fn handle(&self, entity: Entity) -> StoreResult<SlotHandle> {
        let index = self.tracker.get(entity)?;
        Ok(SlotHandle { entity, index })
    }

    fn check_handle(&self, handle: SlotHandle) -> StoreResult<usize> {
        match self.slots.get(handle.index) {
            Some(slot) if slot.entity() == handle.entity => Ok(handle.index),
            _ => Err(StoreError::StaleHandle {
                entity: handle.entity,
                index: handle.index,
            }),
        }
    }

    /// Resolve a handle to its slot
    pub fn resolve(&self, handle: SlotHandle) -> StoreResult<&Component<T>> {
        let index = self.check_handle(handle)?;
        Ok(&self.slots[index])
    }

    /// Resolve a handle to its slot mutably
    pub fn resolve_mut(&mut self, handle: SlotHandle) -> StoreResult<&mut Component<T>> {
        let index = self.check_handle(handle)?;
        Ok(&mut self.slots[index])
    }

    /// Grow capacity to exactly `new_capacity`
    ///
    /// Only grows: asking for a capacity not larger than the current one is
    /// an error.
    pub fn resize(&mut self, new_capacity: usize) -> StoreResult<()> {
        if new_capacity <= self.capacity {
            return Err(StoreError::InvalidOperation {
                requested: new_capacity,
                capacity: self.capacity,
            });
        }
        self.grow_to(new_capacity);
        Ok(())
    }

    /// Release unused capacity, keeping at least `min_capacity`
    pub fn trim(&mut self) {
        let target = self.slots.len().max(self.config.min_capacity);
        if target >= self.capacity {
            return;
        }
        if self.config.log_resize_events {
            debug!(
                "ComponentPool<{}>: trimming {} -> {}",
                std::any::type_name::<T>(),
                self.capacity,
                target
            );
        }
        self.slots.shrink_to(target);
        self.tracker.shrink_to(target);
        self.capacity = target;
        self.stats.resize_count += 1;
    }

    /// Destroy every slot and keep the capacity
    pub fn clear(&mut self) {
        self.stats.destroyed += self.slots.len();
        self.slots.clear();
        self.tracker.clear();
    }

    fn grow_to(&mut self, new_capacity: usize) {
        if self.config.log_resize_events {
            debug!(
                "ComponentPool<{}>: growing {} -> {} ({} occupied)",
                std::any::type_name::<T>(),
                self.capacity,
                new_capacity,
                self.slots.len()
            );
        }
        self.slots.reserve_exact(new_capacity - self.slots.len());
        self.tracker.reserve(new_capacity);
        self.capacity = new_capacity;
        self.stats.resize_count += 1;
    }
}

impl<T> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for ComponentPool<T> {
    type Output = Component<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slots[index]
    }
}

impl<T> IndexMut<usize> for ComponentPool<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.slots[index]
    }
}
