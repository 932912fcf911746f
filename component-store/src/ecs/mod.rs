//! Entity-component core
//!
//! This module provides the storage and lifecycle layer:
//! - Entity keys and allocation
//! - Two-phase component lifecycles
//! - Composition bitmasks shared by all component types
//! - Typed containers with filtered iteration
//! - The container registry and its per-frame passes

mod component;
mod container;
mod entity;
mod lifecycle;
pub mod query;
mod store;
mod tracker;

pub use component::{Component, ComponentData};
pub use container::{ComponentContainer, ErasedContainer, FrameReport};
pub use entity::{Entity, EntityAllocator};
pub use lifecycle::{LifeCycle, LifeCycleState};
pub use query::{AcceptAll, AcceptLifeCycle, Query};
pub use store::{ContainerStore, StoreBuilder};
pub use tracker::{ComponentBit, ComponentTracker, MAX_COMPONENT_TYPES};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tag;
    impl ComponentData for Tag {}

    #[test]
    fn test_store_creation() {
        let store = ContainerStore::new();
        assert_eq!(store.container_count(), 0);
    }

    #[test]
    fn test_entity_lifecycle_through_store() {
        let mut store = ContainerStore::builder().register::<Tag>().build().unwrap();
        let mut entities = EntityAllocator::new();
        let entity = entities.allocate();

        store.create::<Tag>(entity).unwrap();
        assert!(store.contains::<Tag>(entity));
        store.mark_for_removal(entity).unwrap();
        store.end_frame().unwrap();
        store.end_frame().unwrap();
        assert!(!store.contains::<Tag>(entity));
    }
}
