// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use trellis_core::trace::{
    AnimationsCancelledEvent, FlushEvent, LoadStateEvent, NativeFailureEvent,
    NativeTransitionEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_native_transition(&mut self, e: &NativeTransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[native] {:?} serial={} type={} phase={}",
            e.view,
            e.serial.0,
            e.type_name,
            e.phase.as_str(),
        );
    }

    fn on_load_state(&mut self, e: &LoadStateEvent) {
        let _ = writeln!(
            self.writer,
            "[{}] {:?}",
            if e.loaded { "loaded" } else { "unloaded" },
            e.view,
        );
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        let _ = writeln!(
            self.writer,
            "[flush] round={} styled={} laid_out={}",
            e.round, e.styled, e.laid_out,
        );
    }

    fn on_native_failure(&mut self, e: &NativeFailureEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[failure] {:?} type={} message={:?}",
            e.view, e.type_name, e.message,
        );
    }

    fn on_animations_cancelled(&mut self, e: &AnimationsCancelledEvent) {
        let _ = writeln!(
            self.writer,
            "[animations] {:?} cancelled={}",
            e.view, e.count,
        );
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::config::TreeConfig;
    use trellis_core::trace::NativePhase;
    use trellis_harness::{Label, Page, headless_tree};

    use super::*;

    #[test]
    fn pretty_print_flush() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_flush(&FlushEvent {
            round: 1,
            styled: 2,
            laid_out: 3,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert_eq!(output, "[flush] round=1 styled=2 laid_out=3\n");
    }

    #[test]
    fn pretty_print_tree_session() {
        let mut tree = headless_tree(TreeConfig::ios());
        let page = tree.create_view(Page::default());
        let label = tree.create_view(Label::new("x"));
        tree.add_child(page, label).unwrap();

        let buffer = std::rc::Rc::new(std::cell::RefCell::new(Vec::<u8>::new()));
        tree.set_trace_sink(Box::new(PrettyPrintSink::new(Box::new(SharedBuffer(
            buffer.clone(),
        )))));
        tree.attach_page(page).unwrap();

        let output = String::from_utf8(buffer.borrow().clone()).unwrap();
        let create = format!("phase={}", NativePhase::Create.as_str());
        assert_eq!(output.matches(&create).count(), 2, "got: {output}");
        assert!(output.contains("type=Label"), "got: {output}");
        assert!(output.contains("[loaded]"), "got: {output}");
    }

    struct SharedBuffer(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
