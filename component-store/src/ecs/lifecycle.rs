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
//! Two-phase component lifecycle
//!
//! Every slot carries a `(current, next)` pair. Mutations during a frame only
//! touch `next`; the per-frame advance pass promotes `next` into `current`,
//! which is what queries look at. This keeps what systems observe stable for
//! the whole frame.
//!
//! # Removal timing
//!
//! `Removed` is sticky. Once a slot's `next` is `Removed`, the advance pass
//! promotes it and keeps `next` at `Removed`. The slot then stays physically
//! present for one more frame (visible only through an explicit `Removed`
//! query) before the following pass destroys it:
//!
//! ```text
//! frame N    : remove()   -> (Unchanged, Removed)
//! pass  N    : advance()  -> (Removed,   Removed)   still stored
//! pass  N+1  : destroyed, composition bit cleared
//! ```

use std::fmt;

/// State of a component within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeCycleState {
    /// Present and untouched since the last pass
    Unchanged,
    /// Marked changed during the previous frame
    Changed,
    /// Created during the previous frame
    New,
    /// Logically removed, awaiting destruction
    Removed,
}

impl fmt::Display for LifeCycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifeCycleState::Unchanged => "unchanged",
            LifeCycleState::Changed => "changed",
            LifeCycleState::New => "new",
            LifeCycleState::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// The `(current, next)` state pair of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeCycle {
    current: LifeCycleState,
    next: LifeCycleState,
}

impl LifeCycle {
    /// Lifecycle of a freshly created component: `(New, Unchanged)`
    pub const fn created() -> Self {
        LifeCycle {
            current: LifeCycleState::New,
            next: LifeCycleState::Unchanged,
        }
    }

    /// State visible to queries this frame
    pub fn current(&self) -> LifeCycleState {
        self.current
    }

    /// State that the next advance will adopt
    pub fn next(&self) -> LifeCycleState {
        self.next
    }

    /// Mark the component changed
    ///
    /// Has no effect once the component is on its way out.
    pub fn change(&mut self) {
        if self.next != LifeCycleState::Removed {
            self.next = LifeCycleState::Changed;
        }
    }

    /// Mark the component removed
    pub fn remove(&mut self) {
        self.next = LifeCycleState::Removed;
    }

    /// Whether the component has been removed, now or at the next pass
    pub fn is_removed(&self) -> bool {
        self.current == LifeCycleState::Removed || self.next == LifeCycleState::Removed
    }

    /// Promote `next` into `current`
    ///
    /// `next` resets to `Unchanged` unless the adopted state is `Removed`.
    pub fn advance(&mut self) {
        self.current = self.next;
        if self.current != LifeCycleState::Removed {
            self.next = LifeCycleState::Unchanged;
        }
    }
}

impl Default for LifeCycle {
    fn default() -> Self {
        Self::created()
    }
}
