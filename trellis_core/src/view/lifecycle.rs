// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native peer lifecycle: setup, teardown, native child indices, load state.
//!
//! Setup walks a subtree pre-order so every container has its peer before
//! its children are inserted. Teardown walks post-order and detaches
//! children before their container goes away.

use alloc::vec::Vec;
use core::fmt;

use super::id::{INVALID, ViewId};
use super::tree::ViewTree;
use crate::error::{NativeBridgeError, TreeError};
use crate::events::{CREATED_EVENT, DISPOSE_NATIVE_VIEW_EVENT, LOADED_EVENT, UNLOADED_EVENT};
use crate::native::Platform;
use crate::trace::{
    AnimationsCancelledEvent, LoadStateEvent, NativeFailureEvent, NativePhase,
    NativeTransitionEvent,
};

/// Where a view is in its native peer lifecycle.
///
/// ```text
/// Unattached ─create─▶ Created ─init─▶ Initialized ─attach─▶ Attached
///                                          │                    │
///                                          └──────teardown──────┴─▶ TornDown
/// ```
///
/// A torn-down view returns to `Created` on its next setup, reusing a
/// retained peer when recycling allows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NativeState {
    /// Never set up.
    #[default]
    Unattached,
    /// Peer exists but is not initialized. Only observable after a failed
    /// init.
    Created,
    /// Peer initialized and styled, not inserted into a native container.
    /// Layout-only views stay here.
    Initialized,
    /// Peer inserted into its native container.
    Attached,
    /// Peer released or retained for reuse.
    TornDown,
}

impl NativeState {
    /// Returns whether setup completed and teardown has not run since.
    #[must_use]
    pub const fn is_set_up(self) -> bool {
        matches!(self, Self::Initialized | Self::Attached)
    }
}

/// Native linkage of one view.
pub(crate) struct NativeSlot<P: Platform> {
    pub(crate) peer: Option<P::Peer>,
    /// Peer kept after teardown for the next setup.
    pub(crate) retained: Option<P::Peer>,
    pub(crate) in_native_tree: bool,
    pub(crate) recycle: bool,
    pub(crate) state: NativeState,
}

impl<P: Platform> NativeSlot<P> {
    pub(crate) fn new(recycle: bool) -> Self {
        Self {
            peer: None,
            retained: None,
            in_native_tree: false,
            recycle,
            state: NativeState::Unattached,
        }
    }
}

impl<P: Platform> fmt::Debug for NativeSlot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSlot")
            .field("peer", &self.peer)
            .field("retained", &self.retained)
            .field("in_native_tree", &self.in_native_tree)
            .field("recycle", &self.recycle)
            .field("state", &self.state)
            .finish()
    }
}

/// The view whose hook failed during a subtree setup.
struct SetupFailure {
    idx: u32,
    error: NativeBridgeError,
}

impl<P: Platform> ViewTree<P> {
    // -- Public API --

    /// Sets up the native peers of a subtree, pre-order.
    ///
    /// Views that are already set up are skipped, so calling this twice is
    /// harmless. On failure the subtree is force torn down and the error is
    /// returned.
    pub fn setup_ui(&mut self, id: ViewId) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        self.batch_update(|tree| tree.setup_at(idx))
    }

    /// Tears down the native peers of a subtree, post-order, cancelling every
    /// animation on the way.
    ///
    /// Without `force` only views that completed setup are torn down; with
    /// it, views left half-initialized are cleaned up too and no peer is
    /// retained for reuse. The loaded flags are not touched.
    pub fn teardown_ui(&mut self, id: ViewId, force: bool) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        self.batch_update(|tree| tree.teardown_at(idx, force));
        Ok(())
    }

    /// Activates a page root: sets up its whole subtree, then marks it
    /// loaded.
    pub fn attach_page(&mut self, page: ViewId) -> Result<(), TreeError> {
        let idx = self.validate(page)?;
        if !self.nodes[idx as usize].widget.is_page() {
            return Err(TreeError::InvalidOperation("view is not a page"));
        }
        if self.parent[idx as usize] != INVALID {
            return Err(TreeError::InvalidOperation("a page root cannot have a parent"));
        }
        if self.active_pages.contains(&idx) {
            return Err(TreeError::InvalidOperation("page is already attached"));
        }
        self.active_pages.push(idx);
        if let Err(err) = self.batch_update(|tree| tree.setup_at(idx)) {
            self.active_pages.retain(|&p| p != idx);
            return Err(err);
        }
        self.load_subtree(idx);
        Ok(())
    }

    /// Deactivates a page root: tears its subtree down, then clears the
    /// loaded flags.
    pub fn detach_page(&mut self, page: ViewId) -> Result<(), TreeError> {
        let idx = self.validate(page)?;
        if !self.active_pages.contains(&idx) {
            return Err(TreeError::InvalidOperation("page is not attached"));
        }
        self.batch_update(|tree| tree.teardown_at(idx, false));
        self.unload_subtree(idx);
        self.active_pages.retain(|&p| p != idx);
        Ok(())
    }

    /// Returns the attached page roots, in attach order.
    pub fn active_pages(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.active_pages.iter().map(|&idx| self.handle(idx))
    }

    /// Returns whether a view is reachable from an attached page.
    #[must_use]
    pub fn is_loaded(&self, id: ViewId) -> bool {
        self.validate(id)
            .is_ok_and(|idx| self.nodes[idx as usize].loaded)
    }

    /// Returns the lifecycle state of a view's native peer.
    #[must_use]
    pub fn native_state(&self, id: ViewId) -> Option<NativeState> {
        let idx = self.validate(id).ok()?;
        Some(self.nodes[idx as usize].native.state)
    }

    /// Returns the native peer of a view, if it has one.
    #[must_use]
    pub fn native_peer(&self, id: ViewId) -> Option<&P::Peer> {
        let idx = self.validate(id).ok()?;
        self.nodes[idx as usize].native.peer.as_ref()
    }

    /// Returns the native peer of a view mutably.
    pub fn native_peer_mut(&mut self, id: ViewId) -> Option<&mut P::Peer> {
        let idx = self.validate(id).ok()?;
        self.nodes[idx as usize].native.peer.as_mut()
    }

    /// Returns whether a view's peer sits in its native container.
    #[must_use]
    pub fn is_added_to_native_tree(&self, id: ViewId) -> bool {
        self.validate(id)
            .is_ok_and(|idx| self.nodes[idx as usize].native.in_native_tree)
    }

    /// Returns whether a view's peer may be retained for reuse.
    #[must_use]
    pub fn recycle_native_view(&self, id: ViewId) -> bool {
        self.validate(id)
            .is_ok_and(|idx| self.nodes[idx as usize].native.recycle)
    }

    /// Sets whether a view's peer may be retained for reuse. Turning it off
    /// disposes a peer retained earlier.
    pub fn set_recycle_native_view(&mut self, id: ViewId, recycle: bool) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        self.nodes[idx as usize].native.recycle = recycle;
        if !recycle {
            self.dispose_retained(idx);
        }
        Ok(())
    }

    /// Maps a position among `parent`'s children to an index in the native
    /// container that holds them.
    ///
    /// Counts the native slots of the preceding siblings. A layout-only
    /// sibling contributes the inserted peers below it; a sibling whose peer
    /// is not inserted yet contributes nothing. When `parent` is itself
    /// layout-only, the slots in front of `parent` in the shared container
    /// are added.
    #[must_use]
    pub fn child_index_to_native_index(
        &self,
        parent: ViewId,
        logical_index: usize,
    ) -> Option<usize> {
        let p = self.validate(parent).ok()?;
        let logical_index = logical_index.min(self.children[p as usize].len());
        Some(self.native_index_at(p, logical_index))
    }

    // -- Setup --

    /// Sets up the subtree at `idx`, tearing it down again on failure.
    pub(crate) fn setup_at(&mut self, idx: u32) -> Result<(), TreeError> {
        let Err(SetupFailure { idx: failed, error }) = self.setup_node(idx) else {
            return Ok(());
        };
        let view = self.handle(failed);
        let type_name = self.nodes[failed as usize].widget.type_name();
        tracing::error!(?view, type_name, %error, "native setup failed");
        self.tracer.native_failure(&NativeFailureEvent {
            view,
            type_name,
            message: error.message(),
        });
        self.teardown_at(idx, true);
        Err(error.into())
    }

    fn setup_node(&mut self, idx: u32) -> Result<(), SetupFailure> {
        let fail = |error| SetupFailure { idx, error };
        if !self.nodes[idx as usize].native.state.is_set_up() {
            self.init_node(idx).map_err(fail)?;
        }
        let native = &self.nodes[idx as usize].native;
        if native.peer.is_some() && !native.in_native_tree {
            self.add_view_to_native_visual_tree(idx).map_err(fail)?;
        }
        let children = self.children[idx as usize].clone();
        for child in children {
            self.setup_node(child)?;
        }
        Ok(())
    }

    /// Creates (or reuses) and initializes the peer of one view.
    fn init_node(&mut self, idx: u32) -> Result<(), NativeBridgeError> {
        let view = self.handle(idx);
        let reuse = self.config.peer_reuse;
        let node = &mut self.nodes[idx as usize];
        if !node.widget.creates_native_view() {
            node.native.state = NativeState::Initialized;
            return Ok(());
        }

        let recycled = if reuse && node.native.recycle {
            node.native.retained.take()
        } else {
            None
        };
        let phase = match recycled {
            Some(peer) => {
                node.native.peer = Some(peer);
                NativePhase::Reuse
            }
            None => {
                node.native.peer = Some(node.widget.create_native_view(&mut self.context)?);
                node.emit(view, CREATED_EVENT);
                NativePhase::Create
            }
        };
        node.native.state = NativeState::Created;
        self.trace_native(idx, phase);

        let node = &mut self.nodes[idx as usize];
        if let Some(peer) = node.native.peer.as_mut() {
            node.widget.init_native_view(peer, &mut self.context)?;
            node.widget
                .apply_properties(peer, &node.computed, &mut self.context);
        }
        node.native.state = NativeState::Initialized;
        self.trace_native(idx, NativePhase::Init);
        Ok(())
    }

    /// Inserts the peer of `idx` into its native container. Returns whether
    /// insertion happened.
    fn add_view_to_native_visual_tree(&mut self, idx: u32) -> Result<bool, NativeBridgeError> {
        let Some(container) = self.native_container(idx) else {
            return Ok(false);
        };
        let parent = self.parent[idx as usize];
        let logical = self.children[parent as usize]
            .iter()
            .position(|&c| c == idx)
            .unwrap_or(0);
        let index = self.native_index_at(parent, logical);

        let Some(mut child_peer) = self.nodes[idx as usize].native.peer.take() else {
            return Ok(false);
        };
        let host = &mut self.nodes[container as usize];
        let result = match host.native.peer.as_mut() {
            Some(peer) => host
                .widget
                .add_native_child(peer, &mut child_peer, index, &mut self.context),
            None => Ok(false),
        };
        self.nodes[idx as usize].native.peer = Some(child_peer);

        let added = result?;
        if added {
            let native = &mut self.nodes[idx as usize].native;
            native.in_native_tree = true;
            native.state = NativeState::Attached;
            self.trace_native(idx, NativePhase::Attach);
        }
        Ok(added)
    }

    /// Removes the peer of `idx` from its native container. Returns whether
    /// it was inserted.
    fn remove_view_from_native_visual_tree(&mut self, idx: u32) -> bool {
        if !self.nodes[idx as usize].native.in_native_tree {
            return false;
        }
        self.nodes[idx as usize].native.in_native_tree = false;
        if let Some(container) = self.native_container(idx) {
            if let Some(mut child_peer) = self.nodes[idx as usize].native.peer.take() {
                let host = &mut self.nodes[container as usize];
                if let Some(peer) = host.native.peer.as_mut() {
                    host.widget
                        .remove_native_child(peer, &mut child_peer, &mut self.context);
                }
                self.nodes[idx as usize].native.peer = Some(child_peer);
            }
        }
        self.trace_native(idx, NativePhase::Detach);
        true
    }

    /// Returns the nearest ancestor whose widget creates a peer, if that
    /// peer exists.
    fn native_container(&self, idx: u32) -> Option<u32> {
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            let node = &self.nodes[p as usize];
            if node.widget.creates_native_view() {
                return node.native.peer.is_some().then_some(p);
            }
            p = self.parent[p as usize];
        }
        None
    }

    /// Number of peers `idx` currently contributes to its native container.
    fn native_slots(&self, idx: u32) -> usize {
        let node = &self.nodes[idx as usize];
        if node.widget.creates_native_view() {
            usize::from(node.native.in_native_tree)
        } else {
            self.children[idx as usize]
                .iter()
                .map(|&c| self.native_slots(c))
                .sum()
        }
    }

    pub(crate) fn native_index_at(&self, parent: u32, logical: usize) -> usize {
        let preceding = |p: u32, end: usize| -> usize {
            self.children[p as usize][..end]
                .iter()
                .map(|&c| self.native_slots(c))
                .sum()
        };
        let mut index = preceding(parent, logical);
        let mut p = parent;
        while !self.nodes[p as usize].widget.creates_native_view() {
            let grandparent = self.parent[p as usize];
            if grandparent == INVALID {
                break;
            }
            let position = self.children[grandparent as usize]
                .iter()
                .position(|&c| c == p)
                .unwrap_or(0);
            index += preceding(grandparent, position);
            p = grandparent;
        }
        index
    }

    // -- Teardown --

    /// Tears down the subtree at `idx`, post-order.
    pub(crate) fn teardown_at(&mut self, idx: u32, force: bool) {
        let children = self.children[idx as usize].clone();
        for child in children {
            self.teardown_at(child, force);
        }

        let view = self.handle(idx);
        let state = self.nodes[idx as usize].native.state;
        if self.nodes[idx as usize].loaded || state.is_set_up() {
            self.cancel_animations_at(idx);
        }

        if !(state.is_set_up() || (force && state == NativeState::Created)) {
            return;
        }

        self.remove_view_from_native_visual_tree(idx);
        // Forced teardown never retains: the peer may be half-initialized.
        let keep = !force && self.config.peer_reuse && self.nodes[idx as usize].native.recycle;
        let node = &mut self.nodes[idx as usize];
        if let Some(mut peer) = node.native.peer.take() {
            node.widget.reset_native_view(&mut peer, &mut self.context);
            if keep {
                node.native.retained = Some(peer);
            } else {
                node.emit(view, DISPOSE_NATIVE_VIEW_EVENT);
                node.widget.dispose_native_view(peer, &mut self.context);
            }
            self.trace_native(idx, NativePhase::Reset);
            self.trace_native(
                idx,
                if keep {
                    NativePhase::Retain
                } else {
                    NativePhase::Dispose
                },
            );
        }
        self.nodes[idx as usize].native.state = NativeState::TornDown;
    }

    /// Cancels every animation of `idx`, reporting the count.
    pub(crate) fn cancel_animations_at(&mut self, idx: u32) {
        let cancelled = self.nodes[idx as usize].animations.cancel_all();
        if cancelled > 0 {
            self.tracer.animations_cancelled(&AnimationsCancelledEvent {
                view: self.handle(idx),
                count: u32::try_from(cancelled).unwrap_or(u32::MAX),
            });
        }
    }

    /// Disposes a peer retained for reuse, if any.
    pub(crate) fn dispose_retained(&mut self, idx: u32) {
        let view = self.handle(idx);
        let node = &mut self.nodes[idx as usize];
        if let Some(peer) = node.native.retained.take() {
            node.emit(view, DISPOSE_NATIVE_VIEW_EVENT);
            node.widget.dispose_native_view(peer, &mut self.context);
            self.trace_native(idx, NativePhase::Dispose);
        }
    }

    // -- Load state --

    /// Marks a subtree loaded, pre-order. The loaded event fires once the
    /// view's children are loaded too.
    pub(crate) fn load_subtree(&mut self, idx: u32) {
        let view = self.handle(idx);
        let node = &mut self.nodes[idx as usize];
        let newly = !node.loaded;
        if newly {
            node.loaded = true;
            node.widget.on_loaded();
            self.tracer.load_state(&LoadStateEvent { view, loaded: true });
        }
        let children = self.children[idx as usize].clone();
        for child in children {
            self.load_subtree(child);
        }
        if newly {
            self.nodes[idx as usize].emit(view, LOADED_EVENT);
        }
    }

    /// Clears the loaded flag of a subtree, post-order.
    pub(crate) fn unload_subtree(&mut self, idx: u32) {
        let children = self.children[idx as usize].clone();
        for child in children {
            self.unload_subtree(child);
        }
        let view = self.handle(idx);
        let node = &mut self.nodes[idx as usize];
        if node.loaded {
            node.loaded = false;
            node.widget.on_unloaded();
            node.emit(view, UNLOADED_EVENT);
            self.tracer.load_state(&LoadStateEvent {
                view,
                loaded: false,
            });
        }
    }

    fn trace_native(&mut self, idx: u32, phase: NativePhase) {
        let node = &self.nodes[idx as usize];
        let event = NativeTransitionEvent {
            view: self.handle(idx),
            serial: node.serial,
            type_name: node.widget.type_name(),
            phase,
        };
        tracing::debug!(
            view = ?event.view,
            type_name = event.type_name,
            phase = phase.as_str(),
            "native transition"
        );
        self.tracer.native_transition(&event);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::config::TreeConfig;
    use crate::test_support::{Call, TestPage, TestWidget, tree, tree_with};

    #[test]
    fn setup_is_pre_order_and_idempotent() {
        let mut tree = tree();
        let page = tree.create_view(TestPage);
        let stack = tree.create_view(TestWidget::new("Stack"));
        let label = tree.create_view(TestWidget::new("Label"));
        tree.add_child(page, stack).unwrap();
        tree.add_child(stack, label).unwrap();

        tree.attach_page(page).unwrap();
        let created: Vec<_> = tree
            .context()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Create(kind) => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(created, vec!["Page", "Stack", "Label"]);

        let before = tree.context().calls.len();
        tree.setup_ui(page).unwrap();
        assert_eq!(tree.context().calls.len(), before, "second setup is a no-op");
        assert_eq!(tree.native_state(label), Some(NativeState::Attached));
        assert!(tree.is_loaded(label));
    }

    #[test]
    fn teardown_is_post_order() {
        let mut tree = tree();
        let page = tree.create_view(TestPage);
        let stack = tree.create_view(TestWidget::new("Stack"));
        let label = tree.create_view(TestWidget::new("Label"));
        tree.add_child(page, stack).unwrap();
        tree.add_child(stack, label).unwrap();
        tree.attach_page(page).unwrap();
        tree.context_mut().calls.clear();

        tree.remove_child(page, stack).unwrap();
        let disposed: Vec<_> = tree
            .context()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Dispose(peer) => Some(*peer),
                _ => None,
            })
            .collect();
        assert_eq!(disposed, vec![3, 2], "label before its container");
        assert_eq!(tree.native_state(stack), Some(NativeState::TornDown));
        assert!(!tree.is_loaded(label));
        assert!(tree.native_peer(label).is_none());
    }

    #[test]
    fn native_index_skips_layout_only_wrappers() {
        let mut tree = tree();
        let page = tree.create_view(TestPage);
        let a = tree.create_view(TestWidget::new("Label"));
        let wrapper = tree.create_view(TestWidget::layout_only("Wrapper"));
        let w1 = tree.create_view(TestWidget::new("Label"));
        let w2 = tree.create_view(TestWidget::new("Label"));
        let b = tree.create_view(TestWidget::new("Label"));
        tree.add_child(page, a).unwrap();
        tree.add_child(page, wrapper).unwrap();
        tree.add_child(wrapper, w1).unwrap();
        tree.add_child(wrapper, w2).unwrap();
        tree.add_child(page, b).unwrap();
        tree.attach_page(page).unwrap();

        assert_eq!(tree.child_index_to_native_index(page, 2), Some(3));
        assert_eq!(tree.child_index_to_native_index(wrapper, 1), Some(2));
        assert!(tree.native_peer(wrapper).is_none());
        assert_eq!(tree.native_state(wrapper), Some(NativeState::Initialized));

        let inserts: Vec<_> = tree
            .context()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Insert { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(inserts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn failed_setup_rolls_back() {
        let mut tree = tree();
        let page = tree.create_view(TestPage);
        tree.attach_page(page).unwrap();
        let stack = tree.create_view(TestWidget::new("Stack"));
        let bad = tree.create_view(TestWidget::failing("Label"));
        tree.add_child(stack, bad).unwrap();

        let err = tree.add_child(page, stack).unwrap_err();
        assert!(matches!(err, TreeError::NativeBridge(_)));
        assert_eq!(tree.parent(stack), None);
        assert_eq!(tree.child_count(page), 0);
        assert!(!tree.is_loaded(stack));
        assert!(tree.native_peer(stack).is_none());
        assert_eq!(tree.native_state(stack), Some(NativeState::TornDown));
    }

    #[test]
    fn recycled_peer_is_reused() {
        let mut tree = tree_with(TreeConfig::android());
        let page = tree.create_view(TestPage);
        let label = tree.create_view(TestWidget::new("Label"));
        tree.attach_page(page).unwrap();
        tree.add_child(page, label).unwrap();
        let first = *tree.native_peer(label).unwrap();

        tree.remove_child(page, label).unwrap();
        assert!(tree.native_peer(label).is_none());
        tree.add_child(page, label).unwrap();
        assert_eq!(tree.native_peer(label), Some(&first));
    }

    #[test]
    fn disabling_recycling_disposes_retained_peer() {
        let mut tree = tree_with(TreeConfig::android());
        let page = tree.create_view(TestPage);
        let label = tree.create_view(TestWidget::new("Label"));
        tree.attach_page(page).unwrap();
        tree.add_child(page, label).unwrap();
        let first = *tree.native_peer(label).unwrap();
        tree.remove_child(page, label).unwrap();

        tree.set_recycle_native_view(label, false).unwrap();
        assert!(tree.context().calls.contains(&Call::Dispose(first)));
        tree.add_child(page, label).unwrap();
        assert_ne!(tree.native_peer(label), Some(&first));
    }

    #[test]
    fn attach_page_validates_root() {
        let mut tree = tree();
        let label = tree.create_view(TestWidget::new("Label"));
        assert!(matches!(
            tree.attach_page(label),
            Err(TreeError::InvalidOperation(_))
        ));
        let page = tree.create_view(TestPage);
        tree.attach_page(page).unwrap();
        assert!(matches!(
            tree.attach_page(page),
            Err(TreeError::InvalidOperation(_))
        ));
        tree.detach_page(page).unwrap();
        assert!(matches!(
            tree.detach_page(page),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(tree.active_pages().count(), 0);
    }
}
