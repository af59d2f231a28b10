// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording platform for unit tests.

use alloc::vec::Vec;

use crate::config::TreeConfig;
use crate::error::NativeBridgeError;
use crate::native::{Platform, Widget};
use crate::style::Declaration;
use crate::view::ViewTree;

/// Peers are plain numbers handed out in creation order, starting at 1.
#[derive(Debug)]
pub(crate) struct TestPlatform;

impl Platform for TestPlatform {
    type Peer = u32;
    type Context = Recorder;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Create(&'static str),
    Init(u32),
    Apply(u32, Vec<Declaration>),
    Insert { parent: u32, child: u32, index: usize },
    Remove { parent: u32, child: u32 },
    Reset(u32),
    Dispose(u32),
    Layout(u32),
}

#[derive(Debug, Default)]
pub(crate) struct Recorder {
    next_peer: u32,
    pub(crate) calls: Vec<Call>,
}

impl Recorder {
    fn create(&mut self, kind: &'static str) -> u32 {
        self.next_peer += 1;
        self.calls.push(Call::Create(kind));
        self.next_peer
    }
}

pub(crate) fn tree() -> ViewTree<TestPlatform> {
    tree_with(TreeConfig::ios())
}

pub(crate) fn tree_with(config: TreeConfig) -> ViewTree<TestPlatform> {
    ViewTree::new(Recorder::default(), config)
}

/// A container or leaf that records every hook.
#[derive(Debug)]
pub(crate) struct TestWidget {
    pub(crate) kind: &'static str,
    pub(crate) native: bool,
    pub(crate) fail_create: bool,
}

impl TestWidget {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            kind,
            native: true,
            fail_create: false,
        }
    }

    pub(crate) fn layout_only(kind: &'static str) -> Self {
        Self {
            native: false,
            ..Self::new(kind)
        }
    }

    pub(crate) fn failing(kind: &'static str) -> Self {
        Self {
            fail_create: true,
            ..Self::new(kind)
        }
    }
}

impl Widget<TestPlatform> for TestWidget {
    fn type_name(&self) -> &'static str {
        self.kind
    }

    fn creates_native_view(&self) -> bool {
        self.native
    }

    fn create_native_view(&mut self, cx: &mut Recorder) -> Result<u32, NativeBridgeError> {
        if self.fail_create {
            return Err(NativeBridgeError::new("peer factory failed"));
        }
        Ok(cx.create(self.kind))
    }

    fn init_native_view(
        &mut self,
        peer: &mut u32,
        cx: &mut Recorder,
    ) -> Result<(), NativeBridgeError> {
        cx.calls.push(Call::Init(*peer));
        Ok(())
    }

    fn apply_properties(
        &mut self,
        peer: &mut u32,
        declarations: &[Declaration],
        cx: &mut Recorder,
    ) {
        cx.calls.push(Call::Apply(*peer, declarations.to_vec()));
    }

    fn add_native_child(
        &mut self,
        peer: &mut u32,
        child: &mut u32,
        index: usize,
        cx: &mut Recorder,
    ) -> Result<bool, NativeBridgeError> {
        cx.calls.push(Call::Insert {
            parent: *peer,
            child: *child,
            index,
        });
        Ok(true)
    }

    fn remove_native_child(&mut self, peer: &mut u32, child: &mut u32, cx: &mut Recorder) {
        cx.calls.push(Call::Remove {
            parent: *peer,
            child: *child,
        });
    }

    fn reset_native_view(&mut self, peer: &mut u32, cx: &mut Recorder) {
        cx.calls.push(Call::Reset(*peer));
    }

    fn dispose_native_view(&mut self, peer: u32, cx: &mut Recorder) {
        cx.calls.push(Call::Dispose(peer));
    }

    fn request_native_layout(&mut self, peer: &mut u32, cx: &mut Recorder) {
        cx.calls.push(Call::Layout(*peer));
    }
}

/// A page root that hosts its children.
#[derive(Debug)]
pub(crate) struct TestPage;

impl Widget<TestPlatform> for TestPage {
    fn type_name(&self) -> &'static str {
        "Page"
    }

    fn is_page(&self) -> bool {
        true
    }

    fn create_native_view(&mut self, cx: &mut Recorder) -> Result<u32, NativeBridgeError> {
        Ok(cx.create("Page"))
    }

    fn add_native_child(
        &mut self,
        peer: &mut u32,
        child: &mut u32,
        index: usize,
        cx: &mut Recorder,
    ) -> Result<bool, NativeBridgeError> {
        cx.calls.push(Call::Insert {
            parent: *peer,
            child: *child,
            index,
        });
        Ok(true)
    }

    fn remove_native_child(&mut self, peer: &mut u32, child: &mut u32, cx: &mut Recorder) {
        cx.calls.push(Call::Remove {
            parent: *peer,
            child: *child,
        });
    }

    fn dispose_native_view(&mut self, peer: u32, cx: &mut Recorder) {
        cx.calls.push(Call::Dispose(peer));
    }
}
