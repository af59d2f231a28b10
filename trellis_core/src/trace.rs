// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle instrumentation.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! tree calls at each lifecycle step. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional boxed sink owned by the tree. When the
//! `trace` feature is **off**, every `Tracer` method compiles to nothing and
//! installed sinks are dropped. When **on**, each method performs a single
//! `Option` branch before dispatching.

use alloc::boxed::Box;

use crate::view::{ViewId, ViewSerial};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which native-peer transition happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativePhase {
    /// A new peer was created.
    Create,
    /// A retained peer was reused instead of creating one.
    Reuse,
    /// The peer was initialized.
    Init,
    /// The peer was inserted into its native container.
    Attach,
    /// The peer was removed from its native container.
    Detach,
    /// Listeners and property effects were stripped.
    Reset,
    /// The peer was kept for reuse.
    Retain,
    /// The peer was disposed.
    Dispose,
}

impl NativePhase {
    /// Returns a short lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Reuse => "reuse",
            Self::Init => "init",
            Self::Attach => "attach",
            Self::Detach => "detach",
            Self::Reset => "reset",
            Self::Retain => "retain",
            Self::Dispose => "dispose",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every native-peer transition.
#[derive(Clone, Copy, Debug)]
pub struct NativeTransitionEvent {
    /// The view.
    pub view: ViewId,
    /// The view's process-unique serial.
    pub serial: ViewSerial,
    /// Widget type name.
    pub type_name: &'static str,
    /// Which transition.
    pub phase: NativePhase,
}

/// Emitted when a view's loaded flag flips.
#[derive(Clone, Copy, Debug)]
pub struct LoadStateEvent {
    /// The view.
    pub view: ViewId,
    /// New loaded state.
    pub loaded: bool,
}

/// Emitted for each drain round of a flush.
#[derive(Clone, Copy, Debug)]
pub struct FlushEvent {
    /// Round number within the flush, starting at 0.
    pub round: u8,
    /// Views whose cascade was recomputed.
    pub styled: u32,
    /// Views handed to the layout engine.
    pub laid_out: u32,
}

/// Emitted when a widget reports a native bridge failure.
#[derive(Clone, Copy, Debug)]
pub struct NativeFailureEvent<'a> {
    /// The view whose setup failed.
    pub view: ViewId,
    /// Widget type name.
    pub type_name: &'static str,
    /// Platform-supplied message.
    pub message: &'a str,
}

/// Emitted when teardown cancelled a view's animations.
#[derive(Clone, Copy, Debug)]
pub struct AnimationsCancelledEvent {
    /// The view.
    pub view: ViewId,
    /// How many animations were cancelled.
    pub count: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the tree.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a native-peer transition.
    fn on_native_transition(&mut self, e: &NativeTransitionEvent) {
        _ = e;
    }

    /// Called after a view's loaded flag flipped.
    fn on_load_state(&mut self, e: &LoadStateEvent) {
        _ = e;
    }

    /// Called after each flush round.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called when native setup failed.
    fn on_native_failure(&mut self, e: &NativeFailureEvent<'_>) {
        _ = e;
    }

    /// Called when teardown cancelled animations.
    fn on_animations_cancelled(&mut self, e: &AnimationsCancelledEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional owned [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Removes and returns the installed sink, if any.
    #[inline]
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            self.sink.take()
        }
        #[cfg(not(feature = "trace"))]
        {
            None
        }
    }

    /// Emits a [`NativeTransitionEvent`].
    #[inline]
    pub fn native_transition(&mut self, e: &NativeTransitionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_native_transition(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LoadStateEvent`].
    #[inline]
    pub fn load_state(&mut self, e: &LoadStateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_load_state(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushEvent`].
    #[inline]
    pub fn flush(&mut self, e: &FlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NativeFailureEvent`].
    #[inline]
    pub fn native_failure(&mut self, e: &NativeFailureEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_native_failure(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimationsCancelledEvent`].
    #[inline]
    pub fn animations_cancelled(&mut self, e: &AnimationsCancelledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_animations_cancelled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> ViewId {
        ViewId {
            idx: 3,
            generation: 1,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_load_state(&LoadStateEvent {
            view: sample_view(),
            loaded: true,
        });
        sink.on_flush(&FlushEvent {
            round: 0,
            styled: 1,
            laid_out: 2,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.load_state(&LoadStateEvent {
            view: sample_view(),
            loaded: false,
        });
        assert!(tracer.take_sink().is_none());
    }

    #[test]
    fn phase_labels_are_distinct() {
        let phases = [
            NativePhase::Create,
            NativePhase::Reuse,
            NativePhase::Init,
            NativePhase::Attach,
            NativePhase::Detach,
            NativePhase::Reset,
            NativePhase::Retain,
            NativePhase::Dispose,
        ];
        for (i, a) in phases.iter().enumerate() {
            for b in &phases[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            loaded: Rc<RefCell<Vec<bool>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_load_state(&mut self, e: &LoadStateEvent) {
                self.loaded.borrow_mut().push(e.loaded);
            }
        }

        let loaded = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::new(Box::new(RecordingSink {
            loaded: loaded.clone(),
        }));
        tracer.load_state(&LoadStateEvent {
            view: sample_view(),
            loaded: true,
        });
        assert_eq!(*loaded.borrow(), [true]);
    }
}
