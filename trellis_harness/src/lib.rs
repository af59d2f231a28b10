// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless platform and stock widgets for exercising trellis view trees.
//!
//! [`HeadlessPlatform`] keeps its native objects in a [`Screen`]: a flat
//! table of [`NativeNode`]s with child lists and applied properties, plus a
//! journal of every [`NativeOp`] the tree caused. Tests build a tree with
//! [`headless_tree`], drive it through the public `ViewTree` API, and then
//! inspect the screen.
//!
//! The stock widgets cover the shapes the lifecycle distinguishes:
//!
//! - [`Page`]: a root-capable container.
//! - [`Stack`]: a plain container.
//! - [`Label`]: a leaf that cannot hold children.
//! - [`Proxy`]: a layout-only wrapper without a native object.
//! - [`Faulty`]: a leaf that fails at a chosen [`FailPoint`].

use std::fmt;

use trellis_core::config::TreeConfig;
use trellis_core::error::NativeBridgeError;
use trellis_core::native::{Platform, Widget};
use trellis_core::style::Declaration;
use trellis_core::view::ViewTree;

/// Handle to a native object on a [`Screen`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub u32);

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

/// One operation performed on the screen, in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeOp {
    /// A native object was created.
    Create {
        /// The new object.
        peer: PeerId,
        /// Widget type that created it.
        kind: &'static str,
    },
    /// Listeners were wired on an object.
    Init(PeerId),
    /// Resolved declarations were pushed to an object.
    Apply {
        /// The styled object.
        peer: PeerId,
        /// How many declarations were applied.
        count: usize,
    },
    /// An object was inserted into a container.
    Insert {
        /// The container.
        parent: PeerId,
        /// The inserted object.
        child: PeerId,
        /// Native index within the container.
        index: usize,
    },
    /// An object was removed from a container.
    Remove {
        /// The container.
        parent: PeerId,
        /// The removed object.
        child: PeerId,
    },
    /// An object was stripped of listeners.
    Reset(PeerId),
    /// An object was released.
    Dispose(PeerId),
    /// An object's native layout was invalidated.
    Layout(PeerId),
}

/// A native object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeNode {
    /// Widget type that created the object.
    pub kind: &'static str,
    /// Inserted children, in native order.
    pub children: Vec<PeerId>,
    /// The container this object sits in.
    pub parent: Option<PeerId>,
    /// Last declarations applied.
    pub properties: Vec<Declaration>,
    /// Whether listeners are currently wired.
    pub initialized: bool,
    /// Whether the object was released.
    pub disposed: bool,
    /// How many native layout invalidations were received.
    pub layout_requests: u32,
}

impl NativeNode {
    /// Returns the applied value of a property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|d| d.property == name)
            .map(|d| d.value.as_str())
    }
}

/// The native object table of a [`HeadlessPlatform`].
#[derive(Debug, Default)]
pub struct Screen {
    nodes: Vec<NativeNode>,
    journal: Vec<NativeOp>,
}

impl Screen {
    /// Creates an empty screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a native object.
    #[must_use]
    pub fn node(&self, peer: PeerId) -> Option<&NativeNode> {
        self.nodes.get(peer.0 as usize)
    }

    /// Returns the inserted children of a native object.
    #[must_use]
    pub fn children(&self, peer: PeerId) -> &[PeerId] {
        self.node(peer).map_or(&[], |node| node.children.as_slice())
    }

    /// Returns the kinds of a container's children, in native order.
    #[must_use]
    pub fn child_kinds(&self, peer: PeerId) -> Vec<&'static str> {
        self.children(peer)
            .iter()
            .filter_map(|&child| self.node(child).map(|node| node.kind))
            .collect()
    }

    /// Returns the number of objects not yet disposed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.disposed).count()
    }

    /// Returns every operation performed so far.
    #[must_use]
    pub fn journal(&self) -> &[NativeOp] {
        &self.journal
    }

    /// Drains the journal.
    pub fn take_journal(&mut self) -> Vec<NativeOp> {
        std::mem::take(&mut self.journal)
    }

    fn create(&mut self, kind: &'static str) -> PeerId {
        let peer = PeerId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NativeNode {
            kind,
            ..NativeNode::default()
        });
        self.journal.push(NativeOp::Create { peer, kind });
        tracing::debug!(?peer, kind, "native create");
        peer
    }

    fn node_mut(&mut self, peer: PeerId) -> Result<&mut NativeNode, NativeBridgeError> {
        match self.nodes.get_mut(peer.0 as usize) {
            Some(node) if !node.disposed => Ok(node),
            _ => Err(NativeBridgeError::new(format!("{peer:?} is not a live object"))),
        }
    }

    fn init(&mut self, peer: PeerId) -> Result<(), NativeBridgeError> {
        self.node_mut(peer)?.initialized = true;
        self.journal.push(NativeOp::Init(peer));
        Ok(())
    }

    fn apply(&mut self, peer: PeerId, declarations: &[Declaration]) {
        if let Ok(node) = self.node_mut(peer) {
            node.properties = declarations.to_vec();
            self.journal.push(NativeOp::Apply {
                peer,
                count: declarations.len(),
            });
        }
    }

    fn insert(
        &mut self,
        parent: PeerId,
        child: PeerId,
        index: usize,
    ) -> Result<bool, NativeBridgeError> {
        self.node_mut(child)?;
        let container = self.node_mut(parent)?;
        if index > container.children.len() {
            return Err(NativeBridgeError::new(format!(
                "native index {index} out of range for {parent:?}"
            )));
        }
        container.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.journal.push(NativeOp::Insert {
            parent,
            child,
            index,
        });
        tracing::debug!(?parent, ?child, index, "native insert");
        Ok(true)
    }

    fn remove(&mut self, parent: PeerId, child: PeerId) {
        if let Ok(container) = self.node_mut(parent) {
            container.children.retain(|&c| c != child);
        }
        if let Ok(node) = self.node_mut(child) {
            node.parent = None;
        }
        self.journal.push(NativeOp::Remove { parent, child });
    }

    fn reset(&mut self, peer: PeerId) {
        if let Ok(node) = self.node_mut(peer) {
            node.initialized = false;
            node.properties.clear();
        }
        self.journal.push(NativeOp::Reset(peer));
    }

    fn dispose(&mut self, peer: PeerId) {
        if let Ok(node) = self.node_mut(peer) {
            node.disposed = true;
        }
        self.journal.push(NativeOp::Dispose(peer));
        tracing::debug!(?peer, "native dispose");
    }

    fn layout(&mut self, peer: PeerId) {
        if let Ok(node) = self.node_mut(peer) {
            node.layout_requests += 1;
        }
        self.journal.push(NativeOp::Layout(peer));
    }
}

/// A platform whose native objects live in a [`Screen`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessPlatform;

impl Platform for HeadlessPlatform {
    type Peer = PeerId;
    type Context = Screen;
}

/// Creates an empty tree over a fresh [`Screen`].
#[must_use]
pub fn headless_tree(config: TreeConfig) -> ViewTree<HeadlessPlatform> {
    ViewTree::new(Screen::new(), config)
}

/// Forwards the hooks every stock widget shares to the screen.
macro_rules! native_hooks {
    () => {
        fn init_native_view(
            &mut self,
            peer: &mut PeerId,
            cx: &mut Screen,
        ) -> Result<(), NativeBridgeError> {
            cx.init(*peer)
        }

        fn apply_properties(
            &mut self,
            peer: &mut PeerId,
            declarations: &[Declaration],
            cx: &mut Screen,
        ) {
            cx.apply(*peer, declarations);
        }

        fn reset_native_view(&mut self, peer: &mut PeerId, cx: &mut Screen) {
            cx.reset(*peer);
        }

        fn dispose_native_view(&mut self, peer: PeerId, cx: &mut Screen) {
            cx.dispose(peer);
        }

        fn request_native_layout(&mut self, peer: &mut PeerId, cx: &mut Screen) {
            cx.layout(*peer);
        }
    };
}

/// Forwards container insertion to the screen.
macro_rules! container_hooks {
    () => {
        fn add_native_child(
            &mut self,
            peer: &mut PeerId,
            child: &mut PeerId,
            index: usize,
            cx: &mut Screen,
        ) -> Result<bool, NativeBridgeError> {
            cx.insert(*peer, *child, index)
        }

        fn remove_native_child(&mut self, peer: &mut PeerId, child: &mut PeerId, cx: &mut Screen) {
            cx.remove(*peer, *child);
        }
    };
}

/// A root-capable container.
#[derive(Clone, Debug, Default)]
pub struct Page {
    /// Title shown by the host.
    pub title: String,
}

impl Widget<HeadlessPlatform> for Page {
    fn type_name(&self) -> &'static str {
        "Page"
    }

    fn is_page(&self) -> bool {
        true
    }

    fn create_native_view(&mut self, cx: &mut Screen) -> Result<PeerId, NativeBridgeError> {
        Ok(cx.create("Page"))
    }

    native_hooks!();
    container_hooks!();
}

/// A plain container.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stack;

impl Widget<HeadlessPlatform> for Stack {
    fn type_name(&self) -> &'static str {
        "StackLayout"
    }

    fn create_native_view(&mut self, cx: &mut Screen) -> Result<PeerId, NativeBridgeError> {
        Ok(cx.create("StackLayout"))
    }

    native_hooks!();
    container_hooks!();
}

/// A leaf that counts its lifecycle hooks.
#[derive(Clone, Debug, Default)]
pub struct Label {
    /// Displayed text.
    pub text: String,
    /// How often `on_loaded` ran.
    pub loaded_calls: u32,
    /// How often `on_unloaded` ran.
    pub unloaded_calls: u32,
    /// How often the parent changed.
    pub parent_changes: u32,
}

impl Label {
    /// Creates a label showing `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl Widget<HeadlessPlatform> for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn create_native_view(&mut self, cx: &mut Screen) -> Result<PeerId, NativeBridgeError> {
        Ok(cx.create("Label"))
    }

    fn on_loaded(&mut self) {
        self.loaded_calls += 1;
    }

    fn on_unloaded(&mut self) {
        self.unloaded_calls += 1;
    }

    fn on_parent_changed(&mut self, _parent: Option<trellis_core::view::ViewId>) {
        self.parent_changes += 1;
    }

    native_hooks!();
}

/// A layout-only wrapper. Its children are inserted into the nearest
/// ancestor that has a native object.
#[derive(Clone, Copy, Debug, Default)]
pub struct Proxy;

impl Widget<HeadlessPlatform> for Proxy {
    fn type_name(&self) -> &'static str {
        "ProxyViewContainer"
    }

    fn creates_native_view(&self) -> bool {
        false
    }

    fn create_native_view(&mut self, _cx: &mut Screen) -> Result<PeerId, NativeBridgeError> {
        Err(NativeBridgeError::new("layout-only view has no native object"))
    }
}

/// Where a [`Faulty`] widget fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailPoint {
    /// `create_native_view` fails.
    Create,
    /// `init_native_view` fails after the object was created.
    Init,
}

/// A leaf whose native setup fails.
#[derive(Clone, Copy, Debug)]
pub struct Faulty {
    /// The failing hook.
    pub fail: FailPoint,
}

impl Faulty {
    /// Creates a widget failing at `fail`.
    #[must_use]
    pub const fn new(fail: FailPoint) -> Self {
        Self { fail }
    }
}

impl Widget<HeadlessPlatform> for Faulty {
    fn type_name(&self) -> &'static str {
        "Faulty"
    }

    fn create_native_view(&mut self, cx: &mut Screen) -> Result<PeerId, NativeBridgeError> {
        match self.fail {
            FailPoint::Create => Err(NativeBridgeError::new("peer factory failed")),
            FailPoint::Init => Ok(cx.create("Faulty")),
        }
    }

    fn init_native_view(
        &mut self,
        peer: &mut PeerId,
        cx: &mut Screen,
    ) -> Result<(), NativeBridgeError> {
        match self.fail {
            FailPoint::Create => cx.init(*peer),
            FailPoint::Init => Err(NativeBridgeError::new("listener wiring failed")),
        }
    }

    fn reset_native_view(&mut self, peer: &mut PeerId, cx: &mut Screen) {
        cx.reset(*peer);
    }

    fn dispose_native_view(&mut self, peer: PeerId, cx: &mut Screen) {
        cx.dispose(peer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_out_of_range_index() {
        let mut screen = Screen::new();
        let parent = screen.create("StackLayout");
        let child = screen.create("Label");
        assert!(screen.insert(parent, child, 1).is_err());
        assert_eq!(screen.insert(parent, child, 0), Ok(true));
        assert_eq!(screen.children(parent), [child]);
        assert_eq!(screen.node(child).unwrap().parent, Some(parent));
    }

    #[test]
    fn disposed_objects_are_not_live() {
        let mut screen = Screen::new();
        let peer = screen.create("Label");
        screen.dispose(peer);
        assert_eq!(screen.live_count(), 0);
        assert!(screen.init(peer).is_err());
    }

    #[test]
    fn last_applied_value_wins() {
        let mut screen = Screen::new();
        let peer = screen.create("Label");
        screen.apply(
            peer,
            &[Declaration::new("color", "red"), Declaration::new("color", "blue")],
        );
        assert_eq!(screen.node(peer).unwrap().property("color"), Some("blue"));
    }
}
