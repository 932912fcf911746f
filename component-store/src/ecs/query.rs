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
//! Query predicates and cursors
//!
//! A query is a predicate over a single slot. Cursors walk the dense slot
//! range of one pool front to back and yield the slots the query accepts.
//! They never allocate and can't be rewound; ask the container again for a
//! fresh cursor.
//!
//! Cursors borrow the pool, so the pool can't be grown or compacted while
//! one is alive.

use crate::ecs::{Component, Entity, LifeCycleState};
use std::iter::FusedIterator;
use std::slice;

/// Slot predicate
pub trait Query<T> {
    /// Whether `component` should be yielded
    fn accept(&self, component: &Component<T>) -> bool;
}

/// Accepts every slot that is not in its removal grace frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl<T> Query<T> for AcceptAll {
    fn accept(&self, component: &Component<T>) -> bool {
        component.state() != LifeCycleState::Removed
    }
}

/// Accepts slots whose current state is exactly the given one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptLifeCycle(pub LifeCycleState);

impl<T> Query<T> for AcceptLifeCycle {
    fn accept(&self, component: &Component<T>) -> bool {
        component.state() == self.0
    }
}

impl<T, F> Query<T> for F
where
    F: Fn(&Component<T>) -> bool,
{
    fn accept(&self, component: &Component<T>) -> bool {
        self(component)
    }
}

/// Mutable cursor over accepted slots
pub struct ResultIterator<'a, T, Q> {
    slots: slice::IterMut<'a, Component<T>>,
    query: Q,
}

impl<'a, T, Q: Query<T>> ResultIterator<'a, T, Q> {
    pub(crate) fn new(slots: &'a mut [Component<T>], query: Q) -> Self {
        ResultIterator {
            slots: slots.iter_mut(),
            query,
        }
    }
}

impl<'a, T, Q: Query<T>> Iterator for ResultIterator<'a, T, Q> {
    type Item = &'a mut Component<T>;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if self.query.accept(slot) {
                return Some(slot);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

impl<'a, T, Q: Query<T>> FusedIterator for ResultIterator<'a, T, Q> {}

/// Read-only cursor over accepted slots
pub struct ComponentIter<'a, T, Q> {
    slots: slice::Iter<'a, Component<T>>,
    query: Q,
}

impl<'a, T, Q: Query<T>> ComponentIter<'a, T, Q> {
    pub(crate) fn new(slots: &'a [Component<T>], query: Q) -> Self {
        ComponentIter {
            slots: slots.iter(),
            query,
        }
    }
}

impl<'a, T, Q: Query<T>> Iterator for ComponentIter<'a, T, Q> {
    type Item = &'a Component<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let query = &self.query;
        self.slots.by_ref().find(|slot| query.accept(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

impl<'a, T, Q: Query<T>> FusedIterator for ComponentIter<'a, T, Q> {}

/// Cursor yielding the entities of accepted slots
pub struct EntityIterator<'a, T, Q> {
    inner: ComponentIter<'a, T, Q>,
}

impl<'a, T, Q: Query<T>> EntityIterator<'a, T, Q> {
    pub(crate) fn new(slots: &'a [Component<T>], query: Q) -> Self {
        EntityIterator {
            inner: ComponentIter::new(slots, query),
        }
    }
}

impl<'a, T, Q: Query<T>> Iterator for EntityIterator<'a, T, Q> {
    type Item = Entity;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Component::entity)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, Q: Query<T>> FusedIterator for EntityIterator<'a, T, Q> {}
