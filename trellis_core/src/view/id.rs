// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identity types.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Sentinel value indicating "no view" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a view in a [`ViewTree`](super::ViewTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a view is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    /// Slot index into the tree's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the tree's generation for this slot.
    pub(crate) generation: u32,
}

impl ViewId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({}@gen{})", self.idx, self.generation)
    }
}

/// Process-unique view number.
///
/// Unlike [`ViewId`], a serial is never reused, even after the arena slot
/// that carried it is recycled or the owning tree is dropped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewSerial(pub u64);

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

impl ViewSerial {
    pub(crate) fn next() -> Self {
        Self(NEXT_SERIAL.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ViewSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewSerial({})", self.0)
    }
}
