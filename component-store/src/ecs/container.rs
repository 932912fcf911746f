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
//! Typed component containers
//!
//! A [`ComponentContainer`] pairs one [`ComponentPool`] with the composition
//! bit its type was assigned. It is the surface systems talk to: create,
//! mark changed or removed, query, and the per-frame lifecycle pass.
//!
//! The [`ComponentTracker`] is passed in by the caller rather than shared,
//! so every mutation of the composition masks is visible in a signature.
//! [`ContainerStore`](crate::ecs::ContainerStore) does this wiring for you.

use crate::ecs::query::{AcceptAll, AcceptLifeCycle, ComponentIter, EntityIterator, Query, ResultIterator};
use crate::ecs::{Component, ComponentBit, ComponentData, ComponentTracker, Entity, LifeCycleState};
use crate::error::{StoreError, StoreResult};
use crate::pool::{ComponentPool, PoolConfig, PoolStats};
use log::trace;
use std::any::{type_name, Any, TypeId};
use std::ops::AddAssign;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of a lifecycle or flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Slots whose lifecycle was advanced
    pub advanced: usize,
    /// Slots physically destroyed
    pub destroyed: usize,
}

impl AddAssign for FrameReport {
    fn add_assign(&mut self, other: Self) {
        self.advanced += other.advanced;
        self.destroyed += other.destroyed;
    }
}

/// Type-erased view of a container, used for the global per-frame passes
///
/// Downcast through [`as_any`](ErasedContainer::as_any) to reach the typed
/// container.
pub trait ErasedContainer: Send + Sync {
    /// `TypeId` of the stored component type
    fn component_type(&self) -> TypeId;

    /// Name of the stored component type, for diagnostics
    fn type_name(&self) -> &'static str;

    /// Composition bit of the stored component type
    fn bit(&self) -> ComponentBit;

    /// Number of occupied slots, including removed ones awaiting destruction
    fn len(&self) -> usize;

    /// Whether the container holds no slots
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the pool physically holds a slot for `entity`
    fn contains_slot(&self, entity: Entity) -> bool;

    /// Mark `entity`'s component removed
    fn remove(&mut self, entity: Entity) -> StoreResult<()>;

    /// Advance every slot, destroying those already in the removed state
    fn update_lifecycles(&mut self, tracker: &mut ComponentTracker) -> StoreResult<FrameReport>;

    /// Destroy slots already in the removed state without advancing others
    fn flush(&mut self, tracker: &mut ComponentTracker) -> StoreResult<FrameReport>;

    /// Upcast for downcasting to the typed container
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the typed container
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage and lifecycle management for one component type
pub struct ComponentContainer<T> {
    pool: ComponentPool<T>,
    bit: ComponentBit,
}

impl<T: ComponentData> ComponentContainer<T> {
    /// Create a container with the default pool configuration
    ///
    /// Claims the next composition bit from `tracker`.
    pub fn new(tracker: &mut ComponentTracker) -> StoreResult<Self> {
        Self::with_config(tracker, PoolConfig::default())
    }

    /// Create a container with a custom pool configuration
    pub fn with_config(tracker: &mut ComponentTracker, config: PoolConfig) -> StoreResult<Self> {
        let bit = tracker.get_bit()?;
        Ok(ComponentContainer {
            pool: ComponentPool::with_config(config),
            bit,
        })
    }

    /// Composition bit assigned to `T`
    pub fn bit(&self) -> ComponentBit {
        self.bit
    }

    /// Backing pool
    pub fn pool(&self) -> &ComponentPool<T> {
        &self.pool
    }

    /// Slots allocated in the backing pool
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Grow the backing pool to `new_capacity`
    ///
    /// Slots are only ever destroyed by the lifecycle passes, which keep the
    /// composition bits in step; the pool itself is not handed out mutably.
    pub fn resize(&mut self, new_capacity: usize) -> StoreResult<()> {
        self.pool.resize(new_capacity)
    }

    /// Release unused pool capacity
    pub fn trim(&mut self) {
        self.pool.trim();
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.pool.count()
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Pool churn counters
    pub fn stats(&self) -> &PoolStats {
        self.pool.stats()
    }

    /// Give `entity` a default `T`
    ///
    /// Sets the entity's composition bit, then allocates the slot.
    pub fn create(&mut self, tracker: &mut ComponentTracker, entity: Entity) -> StoreResult<&mut T> {
        self.insert(tracker, entity, T::default())
    }

    /// Give `entity` the component `value`
    pub fn insert(
        &mut self,
        tracker: &mut ComponentTracker,
        entity: Entity,
        value: T,
    ) -> StoreResult<&mut T> {
        if self.pool.contains(entity) {
            return Err(StoreError::AlreadyPresent { entity });
        }
        tracker.set_component(entity, self.bit);
        self.pool.insert_for(entity, value)
    }

    /// Whether `entity` has this component
    ///
    /// Answered from the composition mask, so it stays true while a removed
    /// component is in its grace frame.
    pub fn contains(&self, tracker: &ComponentTracker, entity: Entity) -> bool {
        tracker.has_component(entity, self.bit)
    }

    /// Mark `entity`'s component removed
    ///
    /// The slot and its bit survive until the second lifecycle pass.
    pub fn remove(&mut self, entity: Entity) -> StoreResult<()> {
        self.pool.get_mut(entity)?.lifecycle_mut().remove();
        Ok(())
    }

    /// Mark `entity`'s component changed
    pub fn change(&mut self, entity: Entity) -> StoreResult<()> {
        self.pool.get_mut(entity)?.lifecycle_mut().change();
        Ok(())
    }

    /// Payload of `entity`'s component
    pub fn get(&self, entity: Entity) -> StoreResult<&T> {
        Ok(&self.pool.get(entity)?.value)
    }

    /// Mutable payload of `entity`'s component
    ///
    /// Does not mark the component changed; call [`change`](Self::change)
    /// for that.
    pub fn get_mut(&mut self, entity: Entity) -> StoreResult<&mut T> {
        Ok(&mut self.pool.get_mut(entity)?.value)
    }

    /// Full slot of `entity`'s component
    pub fn component(&self, entity: Entity) -> StoreResult<&Component<T>> {
        self.pool.get(entity)
    }

    /// Mutable full slot of `entity`'s component
    pub fn component_mut(&mut self, entity: Entity) -> StoreResult<&mut Component<T>> {
        self.pool.get_mut(entity)
    }

    /// Advance every slot's lifecycle
    ///
    /// Slots whose current state is already `Removed` are destroyed and
    /// their bit cleared instead. Destruction swaps the last slot into the
    /// current index, so that index is examined again before moving on.
    pub fn update_lifecycles(&mut self, tracker: &mut ComponentTracker) -> StoreResult<FrameReport> {
        let mut report = FrameReport::default();
        let mut index = 0;
        while index < self.pool.count() {
            if self.pool[index].state() == LifeCycleState::Removed {
                self.destroy_at(tracker, index)?;
                report.destroyed += 1;
            } else {
                self.pool[index].lifecycle_mut().advance();
                report.advanced += 1;
                index += 1;
            }
        }
        Ok(report)
    }

    /// Destroy slots whose current state is `Removed`, advancing nothing
    pub fn flush(&mut self, tracker: &mut ComponentTracker) -> StoreResult<FrameReport> {
        let mut report = FrameReport::default();
        let mut index = 0;
        while index < self.pool.count() {
            if self.pool[index].state() == LifeCycleState::Removed {
                self.destroy_at(tracker, index)?;
                report.destroyed += 1;
            } else {
                index += 1;
            }
        }
        Ok(report)
    }

    fn destroy_at(&mut self, tracker: &mut ComponentTracker, index: usize) -> StoreResult<()> {
        let entity = self.pool[index].entity();
        tracker.unset_component(entity, self.bit);
        self.pool.destroy(index)?;
        trace!("{}: destroyed component of {}", type_name::<T>(), entity);
        Ok(())
    }

    /// First slot accepted by `query`
    pub fn first<Q: Query<T>>(&mut self, query: Q) -> StoreResult<&mut Component<T>> {
        self.pool
            .slots_mut()
            .iter_mut()
            .find(|slot| query.accept(slot))
            .ok_or(StoreError::NoMatch {
                type_name: type_name::<T>(),
            })
    }

    /// Mutable cursor over slots accepted by `query`
    pub fn iterate<Q: Query<T>>(&mut self, query: Q) -> ResultIterator<'_, T, Q> {
        ResultIterator::new(self.pool.slots_mut(), query)
    }

    /// Every slot not awaiting destruction
    pub fn iterate_all(&mut self) -> ResultIterator<'_, T, AcceptAll> {
        self.iterate(AcceptAll)
    }

    /// Slots changed during the previous frame
    pub fn iterate_changed(&mut self) -> ResultIterator<'_, T, AcceptLifeCycle> {
        self.iterate(AcceptLifeCycle(LifeCycleState::Changed))
    }

    /// Slots created during the previous frame
    pub fn iterate_new(&mut self) -> ResultIterator<'_, T, AcceptLifeCycle> {
        self.iterate(AcceptLifeCycle(LifeCycleState::New))
    }

    /// Slots in their removal grace frame
    pub fn iterate_removed(&mut self) -> ResultIterator<'_, T, AcceptLifeCycle> {
        self.iterate(AcceptLifeCycle(LifeCycleState::Removed))
    }

    /// Slots untouched since the previous pass
    pub fn iterate_unchanged(&mut self) -> ResultIterator<'_, T, AcceptLifeCycle> {
        self.iterate(AcceptLifeCycle(LifeCycleState::Unchanged))
    }

    /// Read-only cursor over slots accepted by `query`
    pub fn view<Q: Query<T>>(&self, query: Q) -> ComponentIter<'_, T, Q> {
        ComponentIter::new(self.pool.slots(), query)
    }

    /// Entities of slots accepted by `query`
    pub fn entities<Q: Query<T>>(&self, query: Q) -> EntityIterator<'_, T, Q> {
        EntityIterator::new(self.pool.slots(), query)
    }

    /// Parallel read-only iteration over slots accepted by `query`
    #[cfg(feature = "parallel")]
    pub fn par_view<'a, Q>(&'a self, query: Q) -> impl ParallelIterator<Item = &'a Component<T>> + 'a
    where
        Q: Query<T> + Send + Sync + 'a,
    {
        self.pool
            .slots()
            .par_iter()
            .filter(move |slot| query.accept(slot))
    }
}

impl<T: ComponentData> ErasedContainer for ComponentContainer<T> {
    fn component_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn bit(&self) -> ComponentBit {
        self.bit
    }

    fn len(&self) -> usize {
        self.pool.count()
    }

    fn contains_slot(&self, entity: Entity) -> bool {
        self.pool.contains(entity)
    }

    fn remove(&mut self, entity: Entity) -> StoreResult<()> {
        ComponentContainer::remove(self, entity)
    }

    fn update_lifecycles(&mut self, tracker: &mut ComponentTracker) -> StoreResult<FrameReport> {
        ComponentContainer::update_lifecycles(self, tracker)
    }

    fn flush(&mut self, tracker: &mut ComponentTracker) -> StoreResult<FrameReport> {
        ComponentContainer::flush(self, tracker)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Transform {
        x: f32,
    }

    impl ComponentData for Transform {}

    fn setup() -> (ComponentTracker, ComponentContainer<Transform>) {
        let mut tracker = ComponentTracker::new();
        let container = ComponentContainer::with_config(&mut tracker, PoolConfig::new(2, 2)).unwrap();
        (tracker, container)
    }

    #[test]
    fn test_create_sets_bit() {
        let (mut tracker, mut container) = setup();
        let e = Entity::new(1);
        container.create(&mut tracker, e).unwrap().x = 4.0;

        assert!(container.contains(&tracker, e));
        assert_eq!(tracker.mask(e), container.bit().mask());
        assert_eq!(container.get(e).unwrap().x, 4.0);
        assert_eq!(container.component(e).unwrap().state(), LifeCycleState::New);
    }

    #[test]
    fn test_create_twice_leaves_state_alone() {
        let (mut tracker, mut container) = setup();
        let e = Entity::new(1);
        container.create(&mut tracker, e).unwrap();
        assert_eq!(
            container.create(&mut tracker, e).unwrap_err(),
            StoreError::AlreadyPresent { entity: e }
        );
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_remove_unknown_entity() {
        let (_, mut container) = setup();
        let ghost = Entity::new(3);
        assert_eq!(
            container.remove(ghost).unwrap_err(),
            StoreError::NotFound { entity: ghost }
        );
    }

    #[test]
    fn test_update_advances_states() {
        let (mut tracker, mut container) = setup();
        let e = Entity::new(1);
        container.create(&mut tracker, e).unwrap();

        let report = container.update_lifecycles(&mut tracker).unwrap();
        assert_eq!(report, FrameReport { advanced: 1, destroyed: 0 });
        assert_eq!(container.component(e).unwrap().state(), LifeCycleState::Unchanged);

        container.change(e).unwrap();
        container.update_lifecycles(&mut tracker).unwrap();
        assert_eq!(container.iterate_changed().count(), 1);
    }

    #[test]
    fn test_removal_takes_two_passes() {
        let (mut tracker, mut container) = setup();
        let e = Entity::new(1);
        container.create(&mut tracker, e).unwrap();
        container.remove(e).unwrap();

        container.update_lifecycles(&mut tracker).unwrap();
        assert!(container.contains(&tracker, e));
        assert_eq!(container.iterate_all().count(), 0);
        assert_eq!(container.iterate_removed().count(), 1);

        let report = container.update_lifecycles(&mut tracker).unwrap();
        assert_eq!(report.destroyed, 1);
        assert!(!container.contains(&tracker, e));
        assert!(container.is_empty());
    }

    #[test]
    fn test_update_revisits_swapped_slot() {
        let (mut tracker, mut container) = setup();
        for id in 0..4 {
            container.create(&mut tracker, Entity::new(id)).unwrap();
        }
        container.remove(Entity::new(0)).unwrap();
        container.remove(Entity::new(3)).unwrap();
        container.update_lifecycles(&mut tracker).unwrap();

        // slot 0 is destroyed and entity 3 (also removed) is swapped into it
        let report = container.update_lifecycles(&mut tracker).unwrap();
        assert_eq!(report, FrameReport { advanced: 2, destroyed: 2 });
        let mut left: Vec<u64> = container.entities(AcceptAll).map(|e| e.id()).collect();
        left.sort_unstable();
        assert_eq!(left, vec![1, 2]);
    }

    #[test]
    fn test_flush_only_destroys() {
        let (mut tracker, mut container) = setup();
        let (a, b) = (Entity::new(1), Entity::new(2));
        container.create(&mut tracker, a).unwrap();
        container.create(&mut tracker, b).unwrap();
        container.remove(a).unwrap();

        assert_eq!(container.flush(&mut tracker).unwrap().destroyed, 0);
        container.update_lifecycles(&mut tracker).unwrap();

        let report = container.flush(&mut tracker).unwrap();
        assert_eq!(report, FrameReport { advanced: 0, destroyed: 1 });
        assert_eq!(container.component(b).unwrap().state(), LifeCycleState::Unchanged);
    }

    #[test]
    fn test_first() {
        let (mut tracker, mut container) = setup();
        assert_eq!(
            container.first(AcceptAll).unwrap_err(),
            StoreError::NoMatch { type_name: type_name::<Transform>() }
        );

        container.create(&mut tracker, Entity::new(1)).unwrap().x = 1.0;
        container.create(&mut tracker, Entity::new(2)).unwrap().x = 2.0;
        let found = container.first(|c: &Component<Transform>| c.value.x > 1.5).unwrap();
        assert_eq!(found.entity(), Entity::new(2));
    }

    #[test]
    fn test_capacity_management() {
        let (mut tracker, mut container) = setup();
        assert_eq!(container.capacity(), 2);
        assert!(matches!(
            container.resize(2),
            Err(StoreError::InvalidOperation { .. })
        ));

        container.resize(16).unwrap();
        assert_eq!(container.capacity(), 16);
        container.create(&mut tracker, Entity::new(1)).unwrap();
        container.create(&mut tracker, Entity::new(2)).unwrap();
        container.create(&mut tracker, Entity::new(3)).unwrap();

        container.trim();
        assert_eq!(container.capacity(), 3);
        assert_eq!(container.len(), 3);
        assert_eq!(tracker.tracked_entities(), 3);
    }

    #[test]
    fn test_erased_downcast() {
        let (mut tracker, container) = setup();
        let mut erased: Box<dyn ErasedContainer> = Box::new(container);
        assert_eq!(erased.component_type(), TypeId::of::<Transform>());

        let typed = erased
            .as_any_mut()
            .downcast_mut::<ComponentContainer<Transform>>()
            .unwrap();
        typed.create(&mut tracker, Entity::new(5)).unwrap();
        assert_eq!(erased.len(), 1);
        assert!(erased.contains_slot(Entity::new(5)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_view() {
        let (mut tracker, mut container) = setup();
        for id in 0..100 {
            container.create(&mut tracker, Entity::new(id)).unwrap().x = id as f32;
        }
        container.remove(Entity::new(0)).unwrap();
        container.update_lifecycles(&mut tracker).unwrap();

        let total: f32 = container.par_view(AcceptAll).map(|c| c.value.x).sum();
        assert_eq!(total, (1..100).sum::<u64>() as f32);
    }
}
