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
//! # Component Store
//!
//! Storage and lifecycle engine for an Entity-Component runtime: dense
//! per-type component pools, composition bitmasks, filtered iteration and
//! deterministic deferred destruction.
//!
//! ## Features
//!
//! - **Dense Pools**: components live in contiguous arrays kept gap-free by swap-removal
//! - **Two-Phase Lifecycles**: `New`/`Changed`/`Unchanged`/`Removed` states advanced once per frame
//! - **Grace Frame**: removed components stay queryable for one pass before destruction
//! - **Composition Masks**: one bit per component type, up to 64 types
//! - **Parallelization**: optional Rayon read-only iteration (`parallel` feature)
//!
//! ## Example
//!
//! ```rust
//! use component_store::ecs::{ComponentData, ContainerStore, EntityAllocator, LifeCycleState};
//!
//! #[derive(Default)]
//! struct Position { x: f32, y: f32 }
//! impl ComponentData for Position {}
//!
//! let mut store = ContainerStore::builder().register::<Position>().build().unwrap();
//! let mut entities = EntityAllocator::new();
//!
//! let entity = entities.allocate();
//! store.create::<Position>(entity).unwrap().x = 3.0;
//!
//! store.end_frame().unwrap();
//! let slot = store.container::<Position>().unwrap().component(entity).unwrap();
//! assert_eq!(slot.state(), LifeCycleState::Unchanged);
//! ```

#![warn(missing_docs)]

/// Entity-component core: entities, lifecycles, containers and the store
pub mod ecs;

/// Error types
pub mod error;

/// Dense component pools
pub mod pool;

pub use ecs::{ContainerStore, Entity};
pub use error::{StoreError, StoreResult};
