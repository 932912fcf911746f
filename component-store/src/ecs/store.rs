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
//! Container registry and per-frame passes
//!
//! The store owns the composition tracker and one container per registered
//! component type. Containers are registered explicitly at startup through
//! [`StoreBuilder`]; there is no discovery step.
//!
//! # Frame Boundary
//!
//! After the mutation phase and any read-only consumers have run, call
//! [`ContainerStore::end_frame`]. It flushes every container (destroying
//! slots already in their grace frame) and then advances every lifecycle.
//! Both passes cover all containers before returning, so the composition
//! masks are consistent before the next frame queries them.
//!
//! # Example
//!
//! ```
//! use component_store::ecs::{ComponentData, ContainerStore, EntityAllocator};
//!
//! #[derive(Default)]
//! struct Health(u32);
//! impl ComponentData for Health {}
//!
//! let mut store = ContainerStore::builder().register::<Health>().build().unwrap();
//! let mut entities = EntityAllocator::new();
//!
//! let hero = entities.allocate();
//! store.create::<Health>(hero).unwrap().0 = 100;
//! assert!(store.contains::<Health>(hero));
//! ```

use crate::ecs::container::{ComponentContainer, ErasedContainer, FrameReport};
use crate::ecs::{ComponentData, ComponentTracker, Entity};
use crate::error::{StoreError, StoreResult};
use crate::pool::PoolConfig;
use log::{debug, trace, warn};
use std::any::{type_name, TypeId};
use std::collections::HashMap;

/// Collects container registrations before the store is built
///
/// Registration errors are held until [`build`](StoreBuilder::build) so the
/// calls can be chained.
pub struct StoreBuilder {
    store: ContainerStore,
    error: Option<StoreError>,
}

impl StoreBuilder {
    /// Pool configuration used by [`register`](Self::register)
    pub fn default_pool_config(mut self, config: PoolConfig) -> Self {
        self.store.default_config = config;
        self
    }

    /// Register a container for `T` with the default pool configuration
    pub fn register<T: ComponentData>(self) -> Self {
        let config = self.store.default_config.clone();
        self.register_with::<T>(config)
    }

    /// Register a container for `T` with a custom pool configuration
    pub fn register_with<T: ComponentData>(mut self, config: PoolConfig) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.store.register_with::<T>(config) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Finish registration
    pub fn build(self) -> StoreResult<ContainerStore> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.store),
        }
    }
}

/// Registry of every component container plus the composition tracker
pub struct ContainerStore {
    tracker: ComponentTracker,
    containers: Vec<Box<dyn ErasedContainer>>,
    by_type: HashMap<TypeId, usize>,
    default_config: PoolConfig,
}

impl ContainerStore {
    /// Create an empty store
    pub fn new() -> Self {
        ContainerStore {
            tracker: ComponentTracker::new(),
            containers: Vec::new(),
            by_type: HashMap::new(),
            default_config: PoolConfig::default(),
        }
    }

    /// Start a builder for an empty store
    pub fn builder() -> StoreBuilder {
        StoreBuilder {
            store: Self::new(),
            error: None,
        }
    }

    /// Register a container for `T` with the default pool configuration
    ///
    /// Returns `false` if `T` was already registered; the duplicate is
    /// ignored and claims no bit.
    pub fn register<T: ComponentData>(&mut self) -> StoreResult<bool> {
        let config = self.default_config.clone();
        self.register_with::<T>(config)
    }

    /// Register a container for `T` with a custom pool configuration
    pub fn register_with<T: ComponentData>(&mut self, config: PoolConfig) -> StoreResult<bool> {
        let type_id = TypeId::of::<T>();
        if self.by_type.contains_key(&type_id) {
            debug!("ContainerStore: {} already registered, ignoring", type_name::<T>());
            return Ok(false);
        }

        let container = ComponentContainer::<T>::with_config(&mut self.tracker, config)?;
        debug!(
            "ContainerStore: registered {} with {}",
            type_name::<T>(),
            container.bit()
        );
        self.by_type.insert(type_id, self.containers.len());
        self.containers.push(Box::new(container));
        Ok(true)
    }

    /// Whether a container for `T` is registered
    pub fn is_registered<T: ComponentData>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered containers
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Composition state shared by all containers
    pub fn tracker(&self) -> &ComponentTracker {
        &self.tracker
    }

    /// Container for `T`
    pub fn container<T: ComponentData>(&self) -> StoreResult<&ComponentContainer<T>> {
        let index = slot_of::<T>(&self.by_type)?;
        self.containers[index]
            .as_any()
            .downcast_ref::<ComponentContainer<T>>()
            .ok_or_else(not_registered::<T>)
    }

    /// Mutable container for `T`
    ///
    /// Operations that touch composition bits (`create`, the lifecycle
    /// passes) need the tracker too; use the store-level methods for those.
    pub fn container_mut<T: ComponentData>(&mut self) -> StoreResult<&mut ComponentContainer<T>> {
        downcast_mut::<T>(&mut self.containers, &self.by_type)
    }

    /// All containers in registration order
    pub fn containers(&self) -> impl Iterator<Item = &dyn ErasedContainer> + '_ {
        self.containers.iter().map(|c| c.as_ref())
    }

    /// Give `entity` a default `T`
    pub fn create<T: ComponentData>(&mut self, entity: Entity) -> StoreResult<&mut T> {
        downcast_mut::<T>(&mut self.containers, &self.by_type)?.create(&mut self.tracker, entity)
    }

    /// Give `entity` the component `value`
    pub fn insert<T: ComponentData>(&mut self, entity: Entity, value: T) -> StoreResult<&mut T> {
        downcast_mut::<T>(&mut self.containers, &self.by_type)?.insert(&mut self.tracker, entity, value)
    }

    /// Payload of `entity`'s `T`
    pub fn get<T: ComponentData>(&self, entity: Entity) -> StoreResult<&T> {
        self.container::<T>()?.get(entity)
    }

    /// Mutable payload of `entity`'s `T`
    pub fn get_mut<T: ComponentData>(&mut self, entity: Entity) -> StoreResult<&mut T> {
        self.container_mut::<T>()?.get_mut(entity)
    }

    /// Whether `entity` has a `T`, including one in its removal grace frame
    ///
    /// Unregistered types report `false`.
    pub fn contains<T: ComponentData>(&self, entity: Entity) -> bool {
        self.container::<T>()
            .map(|c| c.contains(&self.tracker, entity))
            .unwrap_or(false)
    }

    /// Mark `entity`'s `T` removed
    pub fn remove<T: ComponentData>(&mut self, entity: Entity) -> StoreResult<()> {
        self.container_mut::<T>()?.remove(entity)
    }

    /// Mark `entity`'s `T` changed
    pub fn change<T: ComponentData>(&mut self, entity: Entity) -> StoreResult<()> {
        self.container_mut::<T>()?.change(entity)
    }

    /// Mark every component of `entity` removed
    ///
    /// This is how an entity is deleted: there is no entity table, so once
    /// every component is gone the entity no longer exists. Returns the
    /// number of components marked.
    ///
    /// Containers are selected by the slots they hold rather than by the
    /// composition mask, so every live slot is marked even if a bit has
    /// gone stale.
    pub fn mark_for_removal(&mut self, entity: Entity) -> StoreResult<usize> {
        let mut marked = 0;
        for container in &mut self.containers {
            if container.contains_slot(entity) {
                container.remove(entity)?;
                marked += 1;
            }
        }
        if marked == 0 {
            warn!("ContainerStore: {} has no components to remove", entity);
        }
        Ok(marked)
    }

    /// Destroy slots already in their grace frame, in every container
    pub fn flush_all(&mut self) -> StoreResult<FrameReport> {
        let mut report = FrameReport::default();
        for container in &mut self.containers {
            report += container.flush(&mut self.tracker)?;
        }
        trace!("ContainerStore: flush destroyed {}", report.destroyed);
        Ok(report)
    }

    /// Run the lifecycle pass over every container
    pub fn update_all_lifecycles(&mut self) -> StoreResult<FrameReport> {
        let mut report = FrameReport::default();
        for container in &mut self.containers {
            report += container.update_lifecycles(&mut self.tracker)?;
        }
        trace!(
            "ContainerStore: lifecycle pass advanced {}, destroyed {}",
            report.advanced,
            report.destroyed
        );
        Ok(report)
    }

    /// Flush, then advance, across all containers
    pub fn end_frame(&mut self) -> StoreResult<FrameReport> {
        let mut report = self.flush_all()?;
        report += self.update_all_lifecycles()?;
        Ok(report)
    }
}

impl Default for ContainerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_registered<T>() -> StoreError {
    StoreError::ContainerNotRegistered {
        type_name: type_name::<T>(),
    }
}

fn slot_of<T: ComponentData>(by_type: &HashMap<TypeId, usize>) -> StoreResult<usize> {
    by_type
        .get(&TypeId::of::<T>())
        .copied()
        .ok_or_else(not_registered::<T>)
}

// Free function so callers can keep the tracker borrowed alongside.
fn downcast_mut<'a, T: ComponentData>(
    containers: &'a mut [Box<dyn ErasedContainer>],
    by_type: &HashMap<TypeId, usize>,
) -> StoreResult<&'a mut ComponentContainer<T>> {
    let index = slot_of::<T>(by_type)?;
    containers[index]
        .as_any_mut()
        .downcast_mut::<ComponentContainer<T>>()
        .ok_or_else(not_registered::<T>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::LifeCycleState;

    #[derive(Debug, Default, PartialEq)]
    struct Position(f32, f32);
    #[derive(Debug, Default, PartialEq)]
    struct MeshHandle(u32);
    #[derive(Debug, Default, PartialEq)]
    struct Light(f32);

    impl ComponentData for Position {}
    impl ComponentData for MeshHandle {}
    impl ComponentData for Light {}

    fn store() -> ContainerStore {
        ContainerStore::builder()
            .default_pool_config(PoolConfig::new(4, 4))
            .register::<Position>()
            .register::<MeshHandle>()
            .register_with::<Light>(PoolConfig::new(1, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_registration_order_and_bits() {
        let store = store();
        let names: Vec<&str> = store.containers().map(|c| c.type_name()).collect();
        assert_eq!(names.len(), 3);
        assert!(names[0].ends_with("Position"));
        assert!(names[2].ends_with("Light"));

        let bits: Vec<u64> = store.containers().map(|c| c.bit().mask()).collect();
        assert_eq!(bits, vec![1, 2, 4]);
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut store = store();
        assert_eq!(store.register::<Position>(), Ok(false));
        assert_eq!(store.container_count(), 3);
        assert_eq!(store.tracker().assigned_bits(), 3);
    }

    #[test]
    fn test_unregistered_type() {
        #[derive(Default)]
        struct Unknown;
        impl ComponentData for Unknown {}

        let mut store = store();
        let e = Entity::new(1);
        assert!(!store.contains::<Unknown>(e));
        assert!(matches!(
            store.create::<Unknown>(e),
            Err(StoreError::ContainerNotRegistered { .. })
        ));
        assert!(store.container::<Unknown>().is_err());
    }

    #[test]
    fn test_create_get_change() {
        let mut store = store();
        let e = Entity::new(7);
        *store.create::<Position>(e).unwrap() = Position(1.0, 2.0);
        store.insert(e, MeshHandle(3)).unwrap();

        assert_eq!(store.get::<Position>(e), Ok(&Position(1.0, 2.0)));
        assert_eq!(store.tracker().mask(e), 0b011);

        store.end_frame().unwrap();
        store.get_mut::<Position>(e).unwrap().0 = 5.0;
        store.change::<Position>(e).unwrap();
        store.end_frame().unwrap();

        let container = store.container_mut::<Position>().unwrap();
        let changed: Vec<Entity> = container.iterate_changed().map(|c| c.entity()).collect();
        assert_eq!(changed, vec![e]);
    }

    #[test]
    fn test_mark_for_removal() {
        let mut store = store();
        let e = Entity::new(1);
        let other = Entity::new(2);
        store.create::<Position>(e).unwrap();
        store.create::<Light>(e).unwrap();
        store.create::<Light>(other).unwrap();

        assert_eq!(store.mark_for_removal(e), Ok(2));
        let report = store.end_frame().unwrap();
        assert_eq!(report.destroyed, 0);
        assert!(store.contains::<Position>(e));
        assert_eq!(
            store.container::<Light>().unwrap().component(e).unwrap().state(),
            LifeCycleState::Removed
        );

        let report = store.end_frame().unwrap();
        assert_eq!(report.destroyed, 2);
        assert!(!store.contains::<Position>(e));
        assert!(!store.contains::<Light>(e));
        assert!(store.contains::<Light>(other));
        assert_eq!(store.tracker().mask(e), 0);
    }

    #[test]
    fn test_mark_for_removal_skips_bit_without_slot() {
        let mut store = store();
        let e = Entity::new(1);
        store.create::<MeshHandle>(e).unwrap();
        store.create::<Light>(e).unwrap();

        let position_bit = store.container::<Position>().unwrap().bit();
        store.tracker.set_component(e, position_bit);
        assert_eq!(store.tracker().mask(e), 0b111);

        assert_eq!(store.mark_for_removal(e), Ok(2));
        store.end_frame().unwrap();
        for state in [
            store.container::<MeshHandle>().unwrap().component(e).unwrap().state(),
            store.container::<Light>().unwrap().component(e).unwrap().state(),
        ] {
            assert_eq!(state, LifeCycleState::Removed);
        }

        store.end_frame().unwrap();
        assert!(!store.contains::<MeshHandle>(e));
        assert!(!store.contains::<Light>(e));
        assert_eq!(store.tracker().mask(e) & 0b110, 0);
    }

    #[test]
    fn test_mark_for_removal_without_components() {
        let mut store = store();
        assert_eq!(store.mark_for_removal(Entity::new(99)), Ok(0));
    }

    #[test]
    fn test_builder_reports_capacity_error() {
        macro_rules! kinds {
            ($($name:ident),*) => {
                $(
                    #[derive(Default)]
                    struct $name;
                    impl ComponentData for $name {}
                )*
            };
        }
        kinds!(K0, K1, K2, K3);

        let mut store = ContainerStore::new();
        for _ in 0..61 {
            store.tracker.get_bit().unwrap();
        }
        assert_eq!(store.register::<K0>(), Ok(true));
        assert_eq!(store.register::<K1>(), Ok(true));
        assert_eq!(store.register::<K2>(), Ok(true));
        assert_eq!(
            store.register::<K3>(),
            Err(StoreError::CapacityExceeded { limit: 64 })
        );
        assert!(!store.is_registered::<K3>());
    }
}
