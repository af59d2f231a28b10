// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View tree data model.
//!
//! A *view* is a node in the widget tree. Each view has:
//!
//! - An identity: a generational [`ViewId`] handle that becomes stale when
//!   the view is destroyed, a process-unique [`ViewSerial`], and optional
//!   user-assigned `id` and `class_name` strings.
//! - Topology: a non-owning parent index and an ordered child list. The
//!   parent owns its children; insertion order is visual order.
//! - Style state ([`StyleState`](crate::style::StyleState)) and the last
//!   cascade result.
//! - Native linkage: at most one platform peer, whether that peer sits in its
//!   native container, and whether it may be recycled.
//! - Lifecycle: the loaded flag, running animations, and event listeners.
//!
//! # Lifecycle
//!
//! Views are created detached. Adding a subtree under a loaded parent (or
//! attaching a page root with [`ViewTree::attach_page`]) sets up native peers
//! top-down and then marks the subtree loaded. Removing it tears peers down
//! bottom-up, cancelling animations, and only then clears the loaded flags.
//! See [`NativeState`] for the per-view state machine.
//!
//! # Deferred work
//!
//! Style invalidation and layout requests mark the channels in
//! [`dirty`](crate::dirty); they are drained when the outermost
//! [batch scope](crate::batch) closes. Every public mutator opens its own
//! scope, so calls outside an explicit batch flush immediately.

mod cascade;
mod id;
mod lifecycle;
mod traverse;
mod tree;

pub use id::{INVALID, ViewId, ViewSerial};
pub use lifecycle::NativeState;
pub use traverse::{AncestorCriterion, Children, Descendants};
pub use tree::ViewTree;
