// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only traversal and lookup.

use alloc::vec::Vec;
use core::any::{Any, TypeId};

use super::id::{INVALID, ViewId};
use super::tree::ViewTree;
use crate::native::Platform;

/// Selects which ancestor [`ViewTree::get_ancestor`] looks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AncestorCriterion<'a> {
    /// An ancestor whose widget is exactly this concrete type.
    Type(TypeId),
    /// An ancestor whose widget reports this
    /// [`type_name`](crate::native::Widget::type_name).
    Name(&'a str),
}

impl AncestorCriterion<'_> {
    /// Matches ancestors whose widget is a `W`.
    #[must_use]
    pub fn of<W: Any>() -> Self {
        Self::Type(TypeId::of::<W>())
    }
}

/// Iterator over the direct children of a view, in order.
#[derive(Debug)]
pub struct Children<'a, P: Platform> {
    tree: &'a ViewTree<P>,
    iter: core::slice::Iter<'a, u32>,
}

impl<P: Platform> Iterator for Children<'_, P> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        self.iter.next().map(|&idx| self.tree.handle(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<P: Platform> ExactSizeIterator for Children<'_, P> {}

/// Pre-order iterator over the descendants of a view, root excluded.
#[derive(Debug)]
pub struct Descendants<'a, P: Platform> {
    tree: &'a ViewTree<P>,
    stack: Vec<u32>,
}

impl<P: Platform> Iterator for Descendants<'_, P> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let idx = self.stack.pop()?;
        self.stack
            .extend(self.tree.children[idx as usize].iter().rev().copied());
        Some(self.tree.handle(idx))
    }
}

impl<P: Platform> ViewTree<P> {
    /// Returns an iterator over the direct children of a view.
    ///
    /// A stale handle yields nothing.
    #[must_use]
    pub fn children(&self, id: ViewId) -> Children<'_, P> {
        let slice: &[u32] = match self.validate(id) {
            Ok(idx) => &self.children[idx as usize],
            Err(_) => &[],
        };
        Children {
            tree: self,
            iter: slice.iter(),
        }
    }

    /// Returns a pre-order iterator over the subtree below a view.
    #[must_use]
    pub fn descendants(&self, id: ViewId) -> Descendants<'_, P> {
        let stack = match self.validate(id) {
            Ok(idx) => self.children[idx as usize].iter().rev().copied().collect(),
            Err(_) => Vec::new(),
        };
        Descendants { tree: self, stack }
    }

    /// Visits the direct children of a view in order until `visitor`
    /// returns `false`.
    pub fn each_child(&self, id: ViewId, mut visitor: impl FnMut(ViewId) -> bool) {
        for child in self.children(id) {
            if !visitor(child) {
                break;
            }
        }
    }

    /// Visits the subtree below a view in pre-order until `visitor` returns
    /// `false`.
    pub fn each_descendant(&self, id: ViewId, mut visitor: impl FnMut(ViewId) -> bool) {
        for view in self.descendants(id) {
            if !visitor(view) {
                break;
            }
        }
    }

    /// Returns the nearest proper ancestor matching `criterion`.
    #[must_use]
    pub fn get_ancestor(&self, id: ViewId, criterion: AncestorCriterion<'_>) -> Option<ViewId> {
        let idx = self.validate(id).ok()?;
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            let widget = &*self.nodes[p as usize].widget;
            let hit = match criterion {
                AncestorCriterion::Type(type_id) => (widget as &dyn Any).type_id() == type_id,
                AncestorCriterion::Name(name) => widget.type_name() == name,
            };
            if hit {
                return Some(self.handle(p));
            }
            p = self.parent[p as usize];
        }
        None
    }

    /// Finds the first view in pre-order, `root` included, whose
    /// user-assigned id equals `view_id`.
    #[must_use]
    pub fn get_view_by_id(&self, root: ViewId, view_id: &str) -> Option<ViewId> {
        let matches = |id: ViewId| self.nodes[id.idx as usize].id.as_deref() == Some(view_id);
        let root_idx = self.validate(root).ok()?;
        if matches(root) {
            return Some(self.handle(root_idx));
        }
        self.descendants(root).find(|&id| matches(id))
    }

    /// Returns the page a loaded view belongs to, the view itself included.
    #[must_use]
    pub fn page(&self, id: ViewId) -> Option<ViewId> {
        let mut idx = self.validate(id).ok()?;
        if !self.nodes[idx as usize].loaded {
            return None;
        }
        while idx != INVALID {
            if self.nodes[idx as usize].widget.is_page() {
                return Some(self.handle(idx));
            }
            idx = self.parent[idx as usize];
        }
        None
    }

    /// Returns whether `ancestor` is a proper ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ViewId, id: ViewId) -> bool {
        match (self.validate(ancestor), self.validate(id)) {
            (Ok(a), Ok(idx)) => a != idx && self.is_ancestor_of(a, idx),
            _ => false,
        }
    }
}
