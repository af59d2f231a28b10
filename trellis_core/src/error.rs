// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for tree operations.
//!
//! Structural violations fail before any mutation. Lookup misses are not
//! errors: [`get_view_by_id`](crate::view::ViewTree::get_view_by_id) and
//! [`get_ancestor`](crate::view::ViewTree::get_ancestor) return `None`.

use alloc::string::String;

use thiserror::Error;

use crate::view::ViewId;

/// Failure reported by a widget while creating, initializing, or inserting
/// its native peer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeBridgeError {
    message: String,
}

impl NativeBridgeError {
    /// Creates an error carrying a platform-supplied message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the platform-supplied message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned by [`ViewTree`](crate::view::ViewTree) operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A structural rule was violated (re-parenting, cycle creation, index
    /// out of range). The tree is left unmodified.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// The view is not a child of the given parent.
    #[error("view is not a child of the given parent")]
    NotFound,
    /// Input text could not be converted.
    #[error("invalid value {input:?}")]
    Format {
        /// The rejected input, as given.
        input: String,
    },
    /// The platform failed to create, initialize, or attach a native peer.
    /// The affected subtree has been torn down.
    #[error("native bridge failure: {0}")]
    NativeBridge(#[from] NativeBridgeError),
    /// The handle refers to a destroyed view.
    #[error("stale view handle {0:?}")]
    StaleView(ViewId),
}
