// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reentrant batch scopes.
//!
//! While a scope is open, layout requests and style invalidations only mark
//! the [dirty channels](crate::dirty). When the outermost scope closes the
//! tree drains those channels once, so N marks on the same view inside any
//! nesting of scopes produce a single recomputation.
//!
//! Scopes are acquired with [`ViewTree::begin_batch`] or
//! [`ViewTree::batch_update`] and released when the returned [`BatchGuard`]
//! drops, including during unwinding.
//!
//! ```rust,ignore
//! tree.batch_update(|tree| {
//!     tree.request_layout(a)?;
//!     tree.batch_update(|tree| tree.request_layout(a))?;
//!     Ok::<_, TreeError>(())
//! })?;
//! // exactly one layout pass ran here
//! ```

use core::ops::{Deref, DerefMut};

use crate::native::Platform;
use crate::view::ViewTree;

/// Depth counter of nested batch scopes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchScope {
    depth: u32,
}

impl BatchScope {
    /// Returns the current nesting depth.
    #[must_use]
    pub const fn depth(self) -> u32 {
        self.depth
    }

    /// Returns whether any scope is open.
    #[must_use]
    pub const fn is_batching(self) -> bool {
        self.depth > 0
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    /// Closes one scope and returns whether it was the outermost.
    pub(crate) fn exit(&mut self) -> bool {
        debug_assert!(self.depth > 0, "unbalanced batch scope exit");
        self.depth = self.depth.saturating_sub(1);
        self.depth == 0
    }
}

/// An open batch scope on a [`ViewTree`].
///
/// Dereferences to the tree. Dropping the guard closes the scope and, if it
/// was the outermost one, flushes deferred work.
pub struct BatchGuard<'a, P: Platform> {
    tree: &'a mut ViewTree<P>,
}

impl<P: Platform> core::fmt::Debug for BatchGuard<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BatchGuard")
            .field("depth", &self.tree.batch.depth())
            .finish_non_exhaustive()
    }
}

impl<'a, P: Platform> BatchGuard<'a, P> {
    pub(crate) fn new(tree: &'a mut ViewTree<P>) -> Self {
        tree.batch.enter();
        Self { tree }
    }
}

impl<P: Platform> Deref for BatchGuard<'_, P> {
    type Target = ViewTree<P>;

    fn deref(&self) -> &ViewTree<P> {
        self.tree
    }
}

impl<P: Platform> DerefMut for BatchGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut ViewTree<P> {
        self.tree
    }
}

impl<P: Platform> Drop for BatchGuard<'_, P> {
    fn drop(&mut self) {
        if self.tree.batch.exit() {
            self.tree.flush();
        }
    }
}
