// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event journal and JSON export.
//!
//! [`JournalSink`] implements [`TraceSink`] and appends every event to a
//! shared [`Journal`]. The sink is moved into the tree, so the journal is
//! shared through a [`JournalHandle`] that stays with the caller.
//! [`export_json`] writes the recorded entries as a JSON array.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use serde_json::{Value, json};

use trellis_core::trace::{
    AnimationsCancelledEvent, FlushEvent, LoadStateEvent, NativeFailureEvent, NativePhase,
    NativeTransitionEvent, TraceSink,
};
use trellis_core::view::{ViewId, ViewSerial};

/// One recorded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// A native-peer transition.
    Native {
        /// The view.
        view: ViewId,
        /// The view's serial.
        serial: ViewSerial,
        /// Widget type name.
        type_name: &'static str,
        /// Which transition.
        phase: NativePhase,
    },
    /// A loaded flag flip.
    LoadState {
        /// The view.
        view: ViewId,
        /// New state.
        loaded: bool,
    },
    /// A flush round.
    Flush {
        /// Round within the flush.
        round: u8,
        /// Views restyled.
        styled: u32,
        /// Views queued for layout.
        laid_out: u32,
    },
    /// A native setup failure.
    Failure {
        /// The failing view.
        view: ViewId,
        /// Widget type name.
        type_name: &'static str,
        /// Platform message.
        message: String,
    },
    /// Animations cancelled by teardown.
    AnimationsCancelled {
        /// The view.
        view: ViewId,
        /// How many were cancelled.
        count: u32,
    },
}

/// Recorded entries, in emission order.
pub type Journal = Vec<Entry>;

/// Caller-side handle to the journal a [`JournalSink`] writes.
pub type JournalHandle = Rc<RefCell<Journal>>;

/// A [`TraceSink`] that appends every event to a [`Journal`].
#[derive(Debug, Default)]
pub struct JournalSink {
    journal: JournalHandle,
}

impl JournalSink {
    /// Creates a sink with an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the journal this sink writes.
    #[must_use]
    pub fn handle(&self) -> JournalHandle {
        Rc::clone(&self.journal)
    }

    fn push(&self, entry: Entry) {
        self.journal.borrow_mut().push(entry);
    }
}

impl TraceSink for JournalSink {
    fn on_native_transition(&mut self, e: &NativeTransitionEvent) {
        self.push(Entry::Native {
            view: e.view,
            serial: e.serial,
            type_name: e.type_name,
            phase: e.phase,
        });
    }

    fn on_load_state(&mut self, e: &LoadStateEvent) {
        self.push(Entry::LoadState {
            view: e.view,
            loaded: e.loaded,
        });
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.push(Entry::Flush {
            round: e.round,
            styled: e.styled,
            laid_out: e.laid_out,
        });
    }

    fn on_native_failure(&mut self, e: &NativeFailureEvent<'_>) {
        self.push(Entry::Failure {
            view: e.view,
            type_name: e.type_name,
            message: e.message.to_string(),
        });
    }

    fn on_animations_cancelled(&mut self, e: &AnimationsCancelledEvent) {
        self.push(Entry::AnimationsCancelled {
            view: e.view,
            count: e.count,
        });
    }
}

fn view_json(view: ViewId) -> Value {
    json!({
        "index": view.index(),
        "generation": view.generation(),
    })
}

/// Converts one entry to a JSON object.
#[must_use]
pub fn entry_json(entry: &Entry) -> Value {
    match entry {
        Entry::Native {
            view,
            serial,
            type_name,
            phase,
        } => json!({
            "event": "native",
            "view": view_json(*view),
            "serial": serial.0,
            "type": type_name,
            "phase": phase.as_str(),
        }),
        Entry::LoadState { view, loaded } => json!({
            "event": "load_state",
            "view": view_json(*view),
            "loaded": loaded,
        }),
        Entry::Flush {
            round,
            styled,
            laid_out,
        } => json!({
            "event": "flush",
            "round": round,
            "styled": styled,
            "laid_out": laid_out,
        }),
        Entry::Failure {
            view,
            type_name,
            message,
        } => json!({
            "event": "failure",
            "view": view_json(*view),
            "type": type_name,
            "message": message,
        }),
        Entry::AnimationsCancelled { view, count } => json!({
            "event": "animations_cancelled",
            "view": view_json(*view),
            "count": count,
        }),
    }
}

/// Writes `entries` as a pretty-printed JSON array.
pub fn export_json(entries: &[Entry], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = entries.iter().map(entry_json).collect();
    serde_json::to_writer_pretty(&mut *writer, &Value::Array(events))?;
    writeln!(writer)
}
