// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage with allocation, topology, and per-view state management.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{INVALID, ViewId, ViewSerial};
use super::lifecycle::NativeSlot;
use crate::animation::{Animation, AnimationId, AnimationRegistry};
use crate::batch::{BatchGuard, BatchScope};
use crate::config::TreeConfig;
use crate::dirty;
use crate::error::{NativeBridgeError, TreeError};
use crate::events::{Listeners, ViewEvent};
use crate::geometry::Geometry;
use crate::host::{BindingEngine, BindingOptions, PropertyResolver, StyleMatcher, ValueSource};
use crate::native::{Platform, Widget};
use crate::property::TieredResolver;
use crate::style::{Declaration, StyleState};
use crate::trace::{TraceSink, Tracer};

/// Occupies freed slots until they are reused.
#[derive(Debug)]
struct Vacant;

impl<P: Platform> Widget<P> for Vacant {
    fn type_name(&self) -> &'static str {
        "<vacant>"
    }

    fn creates_native_view(&self) -> bool {
        false
    }

    fn create_native_view(&mut self, _cx: &mut P::Context) -> Result<P::Peer, NativeBridgeError> {
        Err(NativeBridgeError::new("vacant slot has no native view"))
    }
}

/// Per-view state other than topology.
pub(crate) struct ViewNode<P: Platform> {
    pub(crate) serial: ViewSerial,
    pub(crate) widget: Box<dyn Widget<P>>,
    pub(crate) id: Option<String>,
    pub(crate) class_name: Option<String>,
    pub(crate) style: StyleState,
    /// Last cascade result, applied to the peer on init and after each
    /// recomputation.
    pub(crate) computed: Vec<Declaration>,
    pub(crate) geometry: Geometry,
    pub(crate) native: NativeSlot<P>,
    pub(crate) loaded: bool,
    pub(crate) animations: AnimationRegistry,
    pub(crate) listeners: Listeners,
    pub(crate) bindings: Vec<String>,
}

impl<P: Platform> ViewNode<P> {
    fn new(widget: Box<dyn Widget<P>>, recycle: bool) -> Self {
        Self {
            serial: ViewSerial::next(),
            widget,
            id: None,
            class_name: None,
            style: StyleState::default(),
            computed: Vec::new(),
            geometry: Geometry::default(),
            native: NativeSlot::new(recycle),
            loaded: false,
            animations: AnimationRegistry::default(),
            listeners: Listeners::default(),
            bindings: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, view: ViewId, name: &'static str) {
        self.listeners.emit(&ViewEvent { name, view });
    }
}

/// Arena of views for one platform.
///
/// Views are addressed by [`ViewId`] handles. Destroyed views are recycled
/// via a free list, and generation counters prevent stale handle access:
/// mutators fail with [`TreeError::StaleView`], queries answer `None`.
pub struct ViewTree<P: Platform> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Per-view state --
    pub(crate) nodes: Vec<ViewNode<P>>,

    // -- Allocation --
    pub(crate) alive: Vec<bool>,
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,

    // -- Deferred work --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) batch: BatchScope,
    pub(crate) layout_requests: Vec<ViewId>,
    pub(crate) layout_passes: u64,
    pub(crate) style_passes: u64,

    // -- Pages --
    pub(crate) active_pages: Vec<u32>,

    // -- Collaborators --
    pub(crate) context: P::Context,
    pub(crate) resolver: Box<dyn PropertyResolver>,
    pub(crate) matcher: Option<Box<dyn StyleMatcher>>,
    pub(crate) binder: Option<Box<dyn BindingEngine>>,
    pub(crate) config: TreeConfig,
    pub(crate) tracer: Tracer,
}

impl<P: Platform> fmt::Debug for ViewTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("len", &self.len())
            .field("active_pages", &self.active_pages)
            .field("batch", &self.batch)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: Platform> ViewTree<P> {
    /// Creates an empty tree bound to a platform context.
    ///
    /// Properties resolve through a [`TieredResolver`]; no style matcher or
    /// binding engine is installed.
    #[must_use]
    pub fn new(context: P::Context, config: TreeConfig) -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            nodes: Vec::new(),
            alive: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            batch: BatchScope::default(),
            layout_requests: Vec::new(),
            layout_passes: 0,
            style_passes: 0,
            active_pages: Vec::new(),
            context,
            resolver: Box::new(TieredResolver::new()),
            matcher: None,
            binder: None,
            config,
            tracer: Tracer::none(),
        }
    }

    /// Replaces the property resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn PropertyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Installs a selector matcher.
    #[must_use]
    pub fn with_style_matcher(mut self, matcher: Box<dyn StyleMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Installs a binding engine.
    #[must_use]
    pub fn with_binding_engine(mut self, binder: Box<dyn BindingEngine>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Installs a trace sink. Events are only delivered with the `trace`
    /// feature.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.take_sink()
    }

    /// Returns the platform context.
    #[must_use]
    pub fn context(&self) -> &P::Context {
        &self.context
    }

    /// Returns the platform context mutably.
    pub fn context_mut(&mut self) -> &mut P::Context {
        &mut self.context
    }

    /// Returns the tree configuration.
    #[must_use]
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    // -- Allocation API --

    /// Creates a detached view and returns its handle.
    pub fn create_view<W: Widget<P>>(&mut self, widget: W) -> ViewId {
        let node = ViewNode::new(Box::new(widget), self.config.recycle_by_default);
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.children[idx as usize].clear();
            self.nodes[idx as usize] = node;
            self.alive[idx as usize] = true;
            idx
        } else {
            let idx = u32::try_from(self.nodes.len()).unwrap_or(INVALID);
            assert!(idx != INVALID, "view arena exhausted");
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.nodes.push(node);
            self.alive.push(true);
            self.generation.push(0);
            idx
        };
        self.dirty.mark(idx, dirty::STYLE);
        self.handle(idx)
    }

    /// Destroys a view and its whole subtree, freeing their slots.
    ///
    /// The view is removed from its parent (or detached, if it is an attached
    /// page), every peer in the subtree is force torn down, bindings are
    /// removed, retained peers are disposed, and all handles into the subtree
    /// become stale.
    pub fn destroy_view(&mut self, id: ViewId) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let parent = self.parent[idx as usize];
        if parent != INVALID {
            self.remove_child(self.handle(parent), id)?;
        }
        if self.active_pages.contains(&idx) {
            self.detach_page(id)?;
        }
        self.teardown_at(idx, true);

        let mut doomed = Vec::new();
        self.collect_post_order(idx, &mut doomed);
        for slot in doomed {
            self.free_slot(slot);
        }
        Ok(())
    }

    /// Returns whether the given handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, id: ViewId) -> bool {
        (id.idx as usize) < self.nodes.len()
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|alive| **alive).count()
    }

    /// Returns whether the tree holds no live views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Topology API --

    /// Appends `child` to `parent`'s children.
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        let p = self.validate(parent)?;
        let end = self.children[p as usize].len();
        self.insert_child(parent, child, end)
    }

    /// Inserts `child` into `parent`'s children at `index`.
    ///
    /// Fails with [`TreeError::InvalidOperation`] if `child` already has a
    /// parent, is `parent` or one of its ancestors, is an attached page, or
    /// `index` is past the end; nothing is modified in that case.
    ///
    /// If `parent` is loaded, the child subtree is set up pre-order and then
    /// marked loaded. A native bridge failure tears the subtree down, undoes
    /// the link, and is returned.
    pub fn insert_child(
        &mut self,
        parent: ViewId,
        child: ViewId,
        index: usize,
    ) -> Result<(), TreeError> {
        let p = self.validate(parent)?;
        let c = self.validate(child)?;
        if p == c {
            return Err(TreeError::InvalidOperation("a view cannot be its own child"));
        }
        if self.parent[c as usize] != INVALID {
            return Err(TreeError::InvalidOperation("view already has a parent"));
        }
        if self.is_ancestor_of(c, p) {
            return Err(TreeError::InvalidOperation(
                "view is an ancestor of the new parent",
            ));
        }
        if self.active_pages.contains(&c) {
            return Err(TreeError::InvalidOperation(
                "an attached page cannot become a child",
            ));
        }
        if index > self.children[p as usize].len() {
            return Err(TreeError::InvalidOperation("child index out of range"));
        }

        self.link(p, c, index);
        self.nodes[c as usize].widget.on_parent_changed(Some(parent));

        let parent_loaded = self.nodes[p as usize].loaded;
        let setup = self.batch_update(|tree| {
            tree.invalidate_style_at(c);
            if parent_loaded {
                tree.setup_at(c)
            } else {
                Ok(())
            }
        });
        if let Err(err) = setup {
            self.unlink(c);
            self.nodes[c as usize].widget.on_parent_changed(None);
            self.batch_update(|tree| tree.invalidate_style_at(c));
            return Err(err);
        }
        if parent_loaded {
            self.load_subtree(c);
        }
        Ok(())
    }

    /// Removes `child` from `parent`.
    ///
    /// Fails with [`TreeError::NotFound`] if `child`'s parent is not
    /// `parent`. The subtree is torn down post-order (cancelling its
    /// animations) before it stops being loaded, and unlinked last.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        let p = self.validate(parent)?;
        let c = self.validate(child)?;
        if self.parent[c as usize] != p {
            return Err(TreeError::NotFound);
        }

        self.batch_update(|tree| {
            tree.teardown_at(c, false);
            tree.unload_subtree(c);
            tree.unlink(c);
            tree.nodes[c as usize].widget.on_parent_changed(None);
            tree.invalidate_style_at(c);
        });
        Ok(())
    }

    /// Removes `child` from whatever parent it has. A parentless view is left
    /// as is.
    pub fn remove_from_parent(&mut self, child: ViewId) -> Result<(), TreeError> {
        let c = self.validate(child)?;
        match self.parent[c as usize] {
            INVALID => Ok(()),
            p => self.remove_child(self.handle(p), child),
        }
    }

    /// Returns the parent of a view, if any.
    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        let idx = self.validate(id).ok()?;
        match self.parent[idx as usize] {
            INVALID => None,
            p => Some(self.handle(p)),
        }
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: ViewId) -> usize {
        self.validate(id)
            .map_or(0, |idx| self.children[idx as usize].len())
    }

    /// Returns the child at `index`, if any.
    #[must_use]
    pub fn child_at(&self, id: ViewId, index: usize) -> Option<ViewId> {
        let idx = self.validate(id).ok()?;
        self.children[idx as usize]
            .get(index)
            .map(|&c| self.handle(c))
    }

    // -- Identity --

    /// Returns the process-unique serial of a view.
    #[must_use]
    pub fn serial(&self, id: ViewId) -> Option<ViewSerial> {
        let idx = self.validate(id).ok()?;
        Some(self.nodes[idx as usize].serial)
    }

    /// Returns the widget type name of a view.
    #[must_use]
    pub fn type_name(&self, id: ViewId) -> Option<&'static str> {
        let idx = self.validate(id).ok()?;
        Some(self.nodes[idx as usize].widget.type_name())
    }

    /// Returns the user-assigned id of a view.
    #[must_use]
    pub fn id(&self, id: ViewId) -> Option<&str> {
        let idx = self.validate(id).ok()?;
        self.nodes[idx as usize].id.as_deref()
    }

    /// Sets the user-assigned id and invalidates the subtree's style.
    pub fn set_id(&mut self, id: ViewId, value: Option<&str>) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let node = &mut self.nodes[idx as usize];
        if node.id.as_deref() == value {
            return Ok(());
        }
        node.id = value.map(ToString::to_string);
        self.batch_update(|tree| tree.invalidate_style_at(idx));
        Ok(())
    }

    /// Returns the widget of a view downcast to `W`.
    #[must_use]
    pub fn widget<W: Widget<P>>(&self, id: ViewId) -> Option<&W> {
        let idx = self.validate(id).ok()?;
        let widget: &dyn Any = &*self.nodes[idx as usize].widget;
        widget.downcast_ref::<W>()
    }

    /// Returns the widget of a view downcast to `W`, mutably.
    pub fn widget_mut<W: Widget<P>>(&mut self, id: ViewId) -> Option<&mut W> {
        let idx = self.validate(id).ok()?;
        let widget: &mut dyn Any = &mut *self.nodes[idx as usize].widget;
        widget.downcast_mut::<W>()
    }

    // -- Properties --

    /// Sets (or with `None`, clears) a local property value.
    pub fn set_property(
        &mut self,
        id: ViewId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), TreeError> {
        self.validate(id)?;
        self.resolver.set(id, property, value, ValueSource::Local);
        Ok(())
    }

    /// Resolves the effective value of a property through the view's lineage.
    #[must_use]
    pub fn property(&self, id: ViewId, property: &str) -> Option<String> {
        let idx = self.validate(id).ok()?;
        let lineage = self.lineage(idx);
        self.resolver.get(&lineage, property)
    }

    // -- Geometry --

    /// Returns the layout measurements of a view.
    #[must_use]
    pub fn geometry(&self, id: ViewId) -> Option<&Geometry> {
        let idx = self.validate(id).ok()?;
        Some(&self.nodes[idx as usize].geometry)
    }

    /// Returns the layout measurements of a view for the layout engine to
    /// write.
    pub fn geometry_mut(&mut self, id: ViewId) -> Result<&mut Geometry, TreeError> {
        let idx = self.validate(id)?;
        Ok(&mut self.nodes[idx as usize].geometry)
    }

    /// Replaces the layout measurements of a view.
    pub fn set_geometry(&mut self, id: ViewId, geometry: Geometry) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let old_bounds = self.nodes[idx as usize].geometry.old_bounds;
        self.nodes[idx as usize].geometry = Geometry {
            old_bounds,
            ..geometry
        };
        Ok(())
    }

    /// Records the bounds computed by a layout pass and returns whether they
    /// differ from the previous pass.
    pub fn record_layout_bounds(&mut self, id: ViewId, bounds: Rect) -> Result<bool, TreeError> {
        let idx = self.validate(id)?;
        Ok(self.nodes[idx as usize].geometry.record_bounds(bounds))
    }

    /// Marks a view's layout dirty.
    ///
    /// Outside a batch the request is handed to the layout engine
    /// immediately; inside one it is coalesced until the outermost scope
    /// closes.
    pub fn request_layout(&mut self, id: ViewId) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        self.batch_update(|tree| tree.dirty.mark(idx, dirty::LAYOUT));
        Ok(())
    }

    /// Drains the views queued for the layout engine, in first-request order.
    /// A view is queued at most once until the next drain.
    pub fn take_layout_requests(&mut self) -> Vec<ViewId> {
        core::mem::take(&mut self.layout_requests)
    }

    /// Returns how many layout passes have run.
    #[must_use]
    pub fn layout_pass_count(&self) -> u64 {
        self.layout_passes
    }

    /// Returns how many style recomputation passes have run.
    #[must_use]
    pub fn style_pass_count(&self) -> u64 {
        self.style_passes
    }

    // -- Batching --

    /// Opens a batch scope. Deferred work flushes when the outermost guard
    /// drops.
    pub fn begin_batch(&mut self) -> BatchGuard<'_, P> {
        BatchGuard::new(self)
    }

    /// Runs `work` inside a batch scope.
    ///
    /// The scope is closed on every exit path, including unwinding.
    pub fn batch_update<R>(&mut self, work: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.begin_batch();
        work(&mut guard)
    }

    /// Returns the current batch nesting depth.
    #[must_use]
    pub fn batch_depth(&self) -> u32 {
        self.batch.depth()
    }

    // -- Animations --

    /// Registers an animation running against a view.
    pub fn register_animation(
        &mut self,
        id: ViewId,
        animation: Box<dyn Animation>,
    ) -> Result<AnimationId, TreeError> {
        let idx = self.validate(id)?;
        Ok(self.nodes[idx as usize].animations.register(animation))
    }

    /// Unregisters an animation without cancelling it.
    pub fn unregister_animation(
        &mut self,
        id: ViewId,
        animation: AnimationId,
    ) -> Option<Box<dyn Animation>> {
        let idx = self.validate(id).ok()?;
        self.nodes[idx as usize].animations.unregister(animation)
    }

    /// Cancels and unregisters every animation of a view.
    pub fn cancel_all_animations(&mut self, id: ViewId) -> Result<usize, TreeError> {
        let idx = self.validate(id)?;
        Ok(self.nodes[idx as usize].animations.cancel_all())
    }

    /// Returns the number of animations registered on a view.
    #[must_use]
    pub fn animation_count(&self, id: ViewId) -> usize {
        self.validate(id)
            .map_or(0, |idx| self.nodes[idx as usize].animations.len())
    }

    // -- Events --

    /// Registers a listener for a named event on a view.
    pub fn on(
        &mut self,
        id: ViewId,
        name: &'static str,
        listener: impl FnMut(&ViewEvent) + 'static,
    ) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        self.nodes[idx as usize]
            .listeners
            .add(name, Box::new(listener));
        Ok(())
    }

    /// Removes every listener for `name` on a view, returning how many were
    /// removed.
    pub fn off(&mut self, id: ViewId, name: &str) -> usize {
        self.validate(id)
            .map_or(0, |idx| self.nodes[idx as usize].listeners.remove(name))
    }

    // -- Bindings --

    /// Binds a property of the view through the installed binding engine.
    pub fn bind(&mut self, id: ViewId, options: &BindingOptions) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let Some(binder) = self.binder.as_mut() else {
            return Err(TreeError::InvalidOperation("no binding engine installed"));
        };
        binder.bind(id, options)?;
        let bindings = &mut self.nodes[idx as usize].bindings;
        if !bindings.contains(&options.target_property) {
            bindings.push(options.target_property.clone());
        }
        Ok(())
    }

    /// Removes the binding on `target_property`.
    pub fn unbind(&mut self, id: ViewId, target_property: &str) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let Some(binder) = self.binder.as_mut() else {
            return Err(TreeError::InvalidOperation("no binding engine installed"));
        };
        binder.unbind(id, target_property);
        self.nodes[idx as usize]
            .bindings
            .retain(|p| p != target_property);
        Ok(())
    }

    /// Returns the target properties currently bound on a view.
    #[must_use]
    pub fn bound_properties(&self, id: ViewId) -> &[String] {
        self.validate(id)
            .map_or(&[], |idx| self.nodes[idx as usize].bindings.as_slice())
    }

    // -- Internal helpers --

    /// Returns the slot index of a live handle.
    pub(crate) fn validate(&self, id: ViewId) -> Result<u32, TreeError> {
        if self.is_alive(id) {
            Ok(id.idx)
        } else {
            Err(TreeError::StaleView(id))
        }
    }

    /// Builds the current handle of a live slot.
    pub(crate) fn handle(&self, idx: u32) -> ViewId {
        ViewId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns whether `ancestor` is `idx` or one of its ancestors.
    pub(crate) fn is_ancestor_of(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Returns `idx` followed by its ancestors, nearest first.
    pub(crate) fn lineage(&self, mut idx: u32) -> Vec<ViewId> {
        let mut lineage = Vec::new();
        while idx != INVALID {
            lineage.push(self.handle(idx));
            idx = self.parent[idx as usize];
        }
        lineage
    }

    fn link(&mut self, p: u32, c: u32, index: usize) {
        self.parent[c as usize] = p;
        self.children[p as usize].insert(index, c);
        // Child style depends on ancestor state.
        let _ = self.dirty.add_dependency(c, p, dirty::STYLE);
    }

    fn unlink(&mut self, c: u32) {
        let p = self.parent[c as usize];
        if p == INVALID {
            return;
        }
        self.children[p as usize].retain(|&k| k != c);
        self.parent[c as usize] = INVALID;
        self.dirty.remove_dependency(c, p, dirty::STYLE);
    }

    fn collect_post_order(&self, idx: u32, out: &mut Vec<u32>) {
        for &child in &self.children[idx as usize] {
            self.collect_post_order(child, out);
        }
        out.push(idx);
    }

    /// Releases a torn-down, detached slot.
    fn free_slot(&mut self, idx: u32) {
        let view = self.handle(idx);
        let bindings = core::mem::take(&mut self.nodes[idx as usize].bindings);
        if let Some(binder) = self.binder.as_mut() {
            for property in &bindings {
                binder.unbind(view, property);
            }
        }
        self.cancel_animations_at(idx);
        self.dispose_retained(idx);
        self.resolver.forget(view);
        self.dirty.remove_key(idx);
        self.layout_requests.retain(|queued| *queued != view);

        self.nodes[idx as usize] = ViewNode::new(Box::new(Vacant), false);
        self.parent[idx as usize] = INVALID;
        self.children[idx as usize].clear();
        self.alive[idx as usize] = false;
        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::test_support::{TestPlatform, TestWidget, tree};

    #[test]
    fn create_and_destroy() {
        let mut tree = tree();
        let id = tree.create_view(TestWidget::new("Label"));
        assert!(tree.is_alive(id));
        assert_eq!(tree.len(), 1);
        tree.destroy_view(id).unwrap();
        assert!(!tree.is_alive(id));
        assert!(tree.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = tree();
        let id1 = tree.create_view(TestWidget::new("Label"));
        tree.destroy_view(id1).unwrap();
        let id2 = tree.create_view(TestWidget::new("Label"));
        assert!(!tree.is_alive(id1));
        assert!(tree.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
        assert_eq!(tree.set_id(id1, Some("x")), Err(TreeError::StaleView(id1)));
        assert_eq!(tree.parent(id1), None);
    }

    #[test]
    fn serials_are_not_reused_with_slots() {
        let mut tree = tree();
        let id1 = tree.create_view(TestWidget::new("Label"));
        let s1 = tree.serial(id1).unwrap();
        tree.destroy_view(id1).unwrap();
        let id2 = tree.create_view(TestWidget::new("Label"));
        assert!(tree.serial(id2).unwrap() > s1);
    }

    #[test]
    fn add_child_and_query() {
        let mut tree = tree();
        let parent = tree.create_view(TestWidget::new("Stack"));
        let a = tree.create_view(TestWidget::new("Label"));
        let b = tree.create_view(TestWidget::new("Label"));
        let c = tree.create_view(TestWidget::new("Label"));

        tree.add_child(parent, a).unwrap();
        tree.add_child(parent, c).unwrap();
        tree.insert_child(parent, b, 1).unwrap();

        assert_eq!(tree.parent(a), Some(parent));
        let kids: Vec<_> = tree.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);
        assert_eq!(tree.child_count(parent), 3);
        assert_eq!(tree.child_at(parent, 2), Some(c));
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut tree = tree();
        let a = tree.create_view(TestWidget::new("Stack"));
        let b = tree.create_view(TestWidget::new("Label"));
        tree.add_child(a, b).unwrap();
        tree.remove_child(a, b).unwrap();
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.child_count(a), 0);
        // The child can be re-parented afterwards.
        tree.add_child(a, b).unwrap();
        assert_eq!(tree.parent(b), Some(a));
    }

    #[test]
    fn reparenting_an_attached_child_fails() {
        let mut tree = tree();
        let p1 = tree.create_view(TestWidget::new("Stack"));
        let p2 = tree.create_view(TestWidget::new("Stack"));
        let child = tree.create_view(TestWidget::new("Label"));
        tree.add_child(p1, child).unwrap();
        assert!(matches!(
            tree.add_child(p2, child),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(tree.parent(child), Some(p1));
        assert_eq!(tree.child_count(p2), 0);
    }

    #[test]
    fn cycles_are_rejected_without_mutation() {
        let mut tree = tree();
        let a = tree.create_view(TestWidget::new("Stack"));
        let b = tree.create_view(TestWidget::new("Stack"));
        assert!(matches!(
            tree.add_child(a, a),
            Err(TreeError::InvalidOperation(_))
        ));
        tree.add_child(a, b).unwrap();
        assert!(matches!(
            tree.add_child(b, a),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(tree.child_count(b), 0);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let mut tree = tree();
        let a = tree.create_view(TestWidget::new("Stack"));
        let b = tree.create_view(TestWidget::new("Label"));
        assert!(matches!(
            tree.insert_child(a, b, 1),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn remove_non_child_is_not_found() {
        let mut tree = tree();
        let a = tree.create_view(TestWidget::new("Stack"));
        let b = tree.create_view(TestWidget::new("Label"));
        assert_eq!(tree.remove_child(a, b), Err(TreeError::NotFound));
    }

    #[test]
    fn destroy_frees_whole_subtree() {
        let mut tree = tree();
        let root = tree.create_view(TestWidget::new("Stack"));
        let mid = tree.create_view(TestWidget::new("Stack"));
        let leaf = tree.create_view(TestWidget::new("Label"));
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();

        tree.destroy_view(mid).unwrap();
        assert!(!tree.is_alive(mid));
        assert!(!tree.is_alive(leaf));
        assert_eq!(tree.child_count(root), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn local_properties_resolve_through_lineage() {
        let mut tree = tree();
        let root = tree.create_view(TestWidget::new("Stack"));
        let leaf = tree.create_view(TestWidget::new("Label"));
        tree.add_child(root, leaf).unwrap();
        tree.set_property(root, "color", Some("red")).unwrap();
        tree.set_property(root, "width", Some("10")).unwrap();
        assert_eq!(tree.property(leaf, "color").as_deref(), Some("red"));
        assert_eq!(tree.property(leaf, "width"), None);
        tree.remove_child(root, leaf).unwrap();
        assert_eq!(tree.property(leaf, "color"), None);
    }

    #[test]
    fn widget_downcast() {
        let mut tree = tree();
        let id = tree.create_view(TestWidget::new("Label"));
        assert_eq!(tree.widget::<TestWidget>(id).map(|w| w.kind), Some("Label"));
        tree.widget_mut::<TestWidget>(id).unwrap().fail_create = true;
        assert!(tree.widget::<TestWidget>(id).unwrap().fail_create);
    }

    #[test]
    fn layout_bounds_deltas() {
        let mut tree: ViewTree<TestPlatform> = tree();
        let id = tree.create_view(TestWidget::new("Label"));
        let bounds = Rect::new(0.0, 0.0, 50.0, 20.0);
        assert!(tree.record_layout_bounds(id, bounds).unwrap());
        assert!(!tree.record_layout_bounds(id, bounds).unwrap());
        assert_eq!(tree.geometry(id).unwrap().old_right(), 50.0);
        tree.geometry_mut(id).unwrap().effective_width = 50.0;
        assert_eq!(tree.geometry(id).unwrap().effective_width, 50.0);
    }
}
