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
//! Error types for component storage
//!
//! Every variant here describes a broken precondition on the caller's side
//! (asking a pool for an entity it never stored, indexing past the occupied
//! range, registering too many component types). None of them are transient,
//! so there is no retry story: callers propagate with `?` and fix the bug.

use crate::ecs::Entity;
use thiserror::Error;

/// Errors raised by pools, containers, the bit tracker and the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The entity has no record in the pool that was asked
    #[error("{entity} is not tracked by this pool")]
    NotFound {
        /// Entity that was looked up
        entity: Entity,
    },

    /// A `first` query accepted no slot
    #[error("no {type_name} component matched the query")]
    NoMatch {
        /// Component type that was scanned
        type_name: &'static str,
    },

    /// Integer slot access past the occupied range
    #[error("slot index {index} out of range (count {count})")]
    IndexOutOfRange {
        /// Requested slot index
        index: usize,
        /// Number of occupied slots
        count: usize,
    },

    /// `resize` was asked to shrink or keep the current capacity
    #[error("cannot resize pool to {requested}: current capacity is {capacity}")]
    InvalidOperation {
        /// Requested capacity
        requested: usize,
        /// Capacity at the time of the call
        capacity: usize,
    },

    /// More distinct component types than the composition mask can hold
    #[error("component type limit reached ({limit} bits already assigned)")]
    CapacityExceeded {
        /// Number of bits available
        limit: u32,
    },

    /// A second slot was requested for an entity already stored in the pool
    #[error("{entity} already has a slot in this pool")]
    AlreadyPresent {
        /// Entity that was created twice
        entity: Entity,
    },

    /// A slot handle no longer points at the entity it was taken for
    #[error("stale handle for {entity} at slot {index}")]
    StaleHandle {
        /// Entity the handle was resolved for
        entity: Entity,
        /// Slot index recorded in the handle
        index: usize,
    },

    /// The store has no container for the requested component type
    #[error("no container registered for {type_name}")]
    ContainerNotRegistered {
        /// Component type that was requested
        type_name: &'static str,
    },
}

/// Result alias used throughout the crate
pub type StoreResult<T> = Result<T, StoreError>;
