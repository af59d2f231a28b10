// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-platform tree configuration.

/// Configuration for a [`ViewTree`](crate::view::ViewTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Whether torn-down peers may be retained and reused on the next setup
    /// instead of being disposed.
    pub peer_reuse: bool,
    /// Initial value of a new view's `recycle_native_view` flag.
    pub recycle_by_default: bool,
    /// Upper bound on style/layout drain rounds in a single flush. Rounds
    /// beyond the first only run when recomputation itself raised new marks.
    pub max_flush_rounds: u8,
}

impl TreeConfig {
    /// Default configuration for Android hosts.
    ///
    /// Peers are retained on teardown and reused by the next setup.
    #[must_use]
    pub const fn android() -> Self {
        Self {
            peer_reuse: true,
            recycle_by_default: true,
            max_flush_rounds: 4,
        }
    }

    /// Default configuration for iOS hosts.
    ///
    /// Peers are always disposed on teardown.
    #[must_use]
    pub const fn ios() -> Self {
        Self {
            peer_reuse: false,
            recycle_by_default: false,
            max_flush_rounds: 4,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::ios()
    }
}
