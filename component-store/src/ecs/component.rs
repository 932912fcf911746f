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
//! Component payloads and pool slots
//!
//! Payloads are plain data. A pool stores each one next to the entity that
//! owns it and the lifecycle that decides when it is visible, so one pass
//! over the dense array touches everything a system needs.

use crate::ecs::{Entity, LifeCycle, LifeCycleState};

/// Marker trait for component payload types
///
/// Payloads should be small value types without behavior. `Default` provides
/// the initial value of a slot created through `create`.
pub trait ComponentData: Default + Send + Sync + 'static {}

/// A single occupied slot: payload, owning entity and lifecycle
#[derive(Debug, Clone, PartialEq)]
pub struct Component<T> {
    /// Payload
    pub value: T,
    entity: Entity,
    lifecycle: LifeCycle,
}

impl<T> Component<T> {
    pub(crate) fn new(entity: Entity, value: T) -> Self {
        Component {
            value,
            entity,
            lifecycle: LifeCycle::created(),
        }
    }

    /// Entity that owns this slot
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Lifecycle of this slot
    pub fn lifecycle(&self) -> &LifeCycle {
        &self.lifecycle
    }

    /// Mutable lifecycle, for marking the slot changed or removed
    pub fn lifecycle_mut(&mut self) -> &mut LifeCycle {
        &mut self.lifecycle
    }

    /// Shorthand for `lifecycle().current()`
    pub fn state(&self) -> LifeCycleState {
        self.lifecycle.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Health(u32);

    impl ComponentData for Health {}

    #[test]
    fn test_new_slot_starts_new() {
        let slot = Component::new(Entity::new(3), Health(10));
        assert_eq!(slot.entity(), Entity::new(3));
        assert_eq!(slot.state(), LifeCycleState::New);
        assert_eq!(slot.value, Health(10));
    }

    #[test]
    fn test_lifecycle_mut() {
        let mut slot = Component::new(Entity::new(3), Health::default());
        slot.lifecycle_mut().change();
        assert_eq!(slot.lifecycle().next(), LifeCycleState::Changed);
    }
}
