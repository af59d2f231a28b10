// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON journal export for trellis lifecycle
//! diagnostics.
//!
//! This crate provides [`TraceSink`](trellis_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`journal::JournalSink`]: in-memory event journal with
//!   [`journal::export_json`] for offline inspection.

pub mod journal;
pub mod pretty;
