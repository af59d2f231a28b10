// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout contract surface.
//!
//! The tree does not lay anything out. The external layout engine writes the
//! measurements it computed into [`Geometry`] and reports final bounds through
//! [`ViewTree::record_layout_bounds`](crate::view::ViewTree::record_layout_bounds),
//! which compares them against the previous pass.

use kurbo::{Insets, Rect};

/// Effective measurements of a view, in device-independent pixels.
///
/// Insets use kurbo's convention: `x0` = left, `y0` = top, `x1` = right,
/// `y1` = bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Effective width.
    pub effective_width: f64,
    /// Effective height.
    pub effective_height: f64,
    /// Effective minimum width constraint.
    pub effective_min_width: f64,
    /// Effective minimum height constraint.
    pub effective_min_height: f64,
    /// Effective margins.
    pub effective_margin: Insets,
    /// Effective paddings.
    pub effective_padding: Insets,
    /// Effective border widths.
    pub effective_border: Insets,
    /// Bounds recorded by the previous layout pass.
    pub(crate) old_bounds: Rect,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            effective_width: 0.0,
            effective_height: 0.0,
            effective_min_width: 0.0,
            effective_min_height: 0.0,
            effective_margin: Insets::ZERO,
            effective_padding: Insets::ZERO,
            effective_border: Insets::ZERO,
            old_bounds: Rect::ZERO,
        }
    }
}

impl Geometry {
    /// Left edge recorded by the previous layout pass.
    #[must_use]
    pub const fn old_left(&self) -> f64 {
        self.old_bounds.x0
    }

    /// Top edge recorded by the previous layout pass.
    #[must_use]
    pub const fn old_top(&self) -> f64 {
        self.old_bounds.y0
    }

    /// Right edge recorded by the previous layout pass.
    #[must_use]
    pub const fn old_right(&self) -> f64 {
        self.old_bounds.x1
    }

    /// Bottom edge recorded by the previous layout pass.
    #[must_use]
    pub const fn old_bottom(&self) -> f64 {
        self.old_bounds.y1
    }

    /// Stores `bounds` as the new snapshot and returns whether it differs
    /// from the previous one.
    pub(crate) fn record_bounds(&mut self, bounds: Rect) -> bool {
        let changed = self.old_bounds != bounds;
        self.old_bounds = bounds;
        changed
    }
}
