// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named view events and listener storage.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::view::ViewId;

/// Emitted after a view and its subtree became loaded.
pub const LOADED_EVENT: &str = "loaded";

/// Emitted after a view was torn down and is no longer loaded.
pub const UNLOADED_EVENT: &str = "unloaded";

/// Emitted after a view's native peer was created (not when reused).
pub const CREATED_EVENT: &str = "created";

/// Emitted just before a view's native peer is disposed.
pub const DISPOSE_NATIVE_VIEW_EVENT: &str = "disposeNativeView";

/// An event delivered to listeners registered with
/// [`ViewTree::on`](crate::view::ViewTree::on).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewEvent {
    /// Event name, one of the constants in this module.
    pub name: &'static str,
    /// The view the event concerns.
    pub view: ViewId,
}

/// Callback invoked for a named event.
pub type Listener = Box<dyn FnMut(&ViewEvent)>;

/// Listeners registered on one view.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(&'static str, Listener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl Listeners {
    pub(crate) fn add(&mut self, name: &'static str, listener: Listener) {
        self.entries.push((name, listener));
    }

    /// Removes every listener for `name`, returning how many were removed.
    pub(crate) fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| *n != name);
        before - self.entries.len()
    }

    pub(crate) fn emit(&mut self, event: &ViewEvent) {
        for (name, listener) in &mut self.entries {
            if *name == event.name {
                listener(event);
            }
        }
    }
}
