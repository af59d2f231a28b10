// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of animations running against a view.
//!
//! Interpolation lives elsewhere; the registry only owns the handles so that
//! teardown can stop every animation before the native peer it drives goes
//! away.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// A running animation handle.
pub trait Animation: fmt::Debug {
    /// Stops the animation. Called at most once by the registry.
    fn cancel(&mut self);
}

/// Identifies an animation within one view's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId(u32);

/// Animations registered on one view.
#[derive(Debug, Default)]
pub struct AnimationRegistry {
    entries: Vec<(AnimationId, Box<dyn Animation>)>,
    next: u32,
}

impl AnimationRegistry {
    /// Takes ownership of `animation` and returns its id.
    pub fn register(&mut self, animation: Box<dyn Animation>) -> AnimationId {
        let id = AnimationId(self.next);
        self.next = self.next.wrapping_add(1);
        self.entries.push((id, animation));
        id
    }

    /// Removes an animation without cancelling it and hands it back.
    pub fn unregister(&mut self, id: AnimationId) -> Option<Box<dyn Animation>> {
        let pos = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(pos).1)
    }

    /// Cancels and drops every registered animation, returning how many were
    /// cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let entries = core::mem::take(&mut self.entries);
        let count = entries.len();
        for (_, mut animation) in entries {
            animation.cancel();
        }
        count
    }

    /// Returns the number of registered animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no animations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
