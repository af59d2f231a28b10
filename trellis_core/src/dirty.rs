// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Deferred recomputation is tracked per view on [`understory_dirty`]
//! channels. A mark records that a view needs work; the work itself runs when
//! the outermost [batch scope](crate::batch) exits, so any number of marks on
//! the same view collapse into one recomputation.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`STYLE`] has dependency edges from child to parent and
//!   is always marked with [`EagerPolicy`](understory_dirty::EagerPolicy):
//!   any change to a view's classes, pseudo-classes, id, or ancestry can
//!   alter which descendant selectors match.
//!
//! - **Local-only**: [`LAYOUT`] is never propagated. Native containers
//!   forward layout invalidation to their hosts themselves.

use understory_dirty::Channel;

/// Style state changed; the cascade must be recomputed.
pub const STYLE: Channel = Channel::new(0);

/// Layout was requested; the view is queued for the external layout engine.
pub const LAYOUT: Channel = Channel::new(1);
