// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability traits implemented by platform integrations and widget types.
//!
//! The tree owns the lifecycle algorithm: traversal order, idempotence
//! guards, recycling, and failure cleanup. A [`Platform`] names the native
//! peer type and the context handed to every hook. Each concrete
//! [`Widget`] supplies the per-type pieces:
//!
//! - **Factory**: [`create_native_view`](Widget::create_native_view) and
//!   [`init_native_view`](Widget::init_native_view).
//! - **Container insertion**: [`add_native_child`](Widget::add_native_child)
//!   and [`remove_native_child`](Widget::remove_native_child), called on the
//!   native container with the child's peer.
//! - **Teardown**: [`reset_native_view`](Widget::reset_native_view) and
//!   [`dispose_native_view`](Widget::dispose_native_view).
//!
//! Widgets that only exist for layout return `false` from
//! [`creates_native_view`](Widget::creates_native_view); their children are
//! inserted into the nearest ancestor that has a peer.

use core::any::Any;
use core::fmt;

use crate::error::NativeBridgeError;
use crate::style::Declaration;
use crate::view::ViewId;

/// A host platform.
pub trait Platform: 'static {
    /// The native UI object a view delegates to.
    type Peer: fmt::Debug;
    /// Platform state passed to every widget hook (application context,
    /// activity, window).
    type Context;
}

/// Per-type behaviour of a view.
///
/// All hooks are invoked by the [`ViewTree`](crate::view::ViewTree); none of
/// them may be called by application code.
pub trait Widget<P: Platform>: Any + fmt::Debug {
    /// Type name used by type selectors and
    /// [`AncestorCriterion::Name`](crate::view::AncestorCriterion::Name).
    fn type_name(&self) -> &'static str;

    /// Whether this view is a page (a root-capable top-level screen).
    fn is_page(&self) -> bool {
        false
    }

    /// Whether this view has a native peer. Layout-only wrappers return
    /// `false`.
    fn creates_native_view(&self) -> bool {
        true
    }

    /// Creates the native peer.
    fn create_native_view(&mut self, cx: &mut P::Context) -> Result<P::Peer, NativeBridgeError>;

    /// Wires listeners on a freshly created or reused peer.
    fn init_native_view(
        &mut self,
        peer: &mut P::Peer,
        cx: &mut P::Context,
    ) -> Result<(), NativeBridgeError> {
        _ = (peer, cx);
        Ok(())
    }

    /// Pushes resolved style declarations to the peer.
    fn apply_properties(
        &mut self,
        peer: &mut P::Peer,
        declarations: &[Declaration],
        cx: &mut P::Context,
    ) {
        _ = (peer, declarations, cx);
    }

    /// Inserts `child` into this view's native container at `index`.
    ///
    /// Returns `Ok(false)` if the peer cannot hold children (yet).
    fn add_native_child(
        &mut self,
        peer: &mut P::Peer,
        child: &mut P::Peer,
        index: usize,
        cx: &mut P::Context,
    ) -> Result<bool, NativeBridgeError> {
        _ = (peer, child, index, cx);
        Ok(false)
    }

    /// Removes `child` from this view's native container.
    fn remove_native_child(
        &mut self,
        peer: &mut P::Peer,
        child: &mut P::Peer,
        cx: &mut P::Context,
    ) {
        _ = (peer, child, cx);
    }

    /// Strips listeners and property effects from the peer.
    fn reset_native_view(&mut self, peer: &mut P::Peer, cx: &mut P::Context) {
        _ = (peer, cx);
    }

    /// Releases the peer's native resources.
    fn dispose_native_view(&mut self, peer: P::Peer, cx: &mut P::Context) {
        _ = (peer, cx);
    }

    /// Invalidates the peer's native layout.
    fn request_native_layout(&mut self, peer: &mut P::Peer, cx: &mut P::Context) {
        _ = (peer, cx);
    }

    /// Called after the view became loaded.
    fn on_loaded(&mut self) {}

    /// Called after the view stopped being loaded.
    fn on_unloaded(&mut self) {}

    /// Called after the view was linked to or unlinked from a parent.
    fn on_parent_changed(&mut self, parent: Option<ViewId>) {
        _ = parent;
    }
}
