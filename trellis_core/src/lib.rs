// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-tree substrate for widgets backed by native platform peers.
//!
//! `trellis_core` owns the abstract view tree that sits between a declarative
//! widget hierarchy and the imperative UI objects of a host platform. It is
//! `no_std` compatible (with `alloc`) and keeps nodes in an arena addressed by
//! generational [`ViewId`](view::ViewId) handles.
//!
//! # Architecture
//!
//! ```text
//!   application code
//!       │  add_child / remove_child / add_pseudo_class / request_layout
//!       ▼
//!   ViewTree ──► dirty channels ──► flush (outermost batch exit)
//!       │                              │
//!       │                              ├─► StyleMatcher + PropertyResolver
//!       │                              └─► layout requests (external engine)
//!       ▼
//!   setup_ui / teardown_ui ──► Widget hooks ──► native peers (Platform)
//! ```
//!
//! **[`view`]**: The arena tree: topology, identity, traversal, and the
//! native-peer lifecycle state machine.
//!
//! **[`native`]**: The [`Platform`](native::Platform) and
//! [`Widget`](native::Widget) capability traits concrete widget types
//! implement to create and wire their peers.
//!
//! **[`style`]**: CSS class and pseudo-class sets, inline style parsing, and
//! visual-state mapping.
//!
//! **[`batch`]**: Reentrant batch scopes that coalesce layout and style
//! recomputation, backed by the channels in [`dirty`].
//!
//! **[`animation`]**: Per-node registry of running animations, cancelled on
//! teardown.
//!
//! **[`host`]**: Contracts of the external collaborators (property engine,
//! selector matcher, binding engine). [`property`] ships a reference
//! property resolver.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! lifecycle instrumentation.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod batch;
pub mod config;
pub mod convert;
pub mod dirty;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod native;
pub mod property;
pub mod style;
pub mod trace;
pub mod view;

#[cfg(test)]
mod test_support;
