// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class and pseudo-class mutation, cascade recomputation, and the flush
//! that drains deferred work.

use alloc::string::ToString;
use alloc::vec::Vec;

use understory_dirty::EagerPolicy;

use super::id::{INVALID, ViewId};
use super::tree::ViewTree;
use crate::dirty;
use crate::error::TreeError;
use crate::host::StyleTarget;
use crate::native::Platform;
use crate::style::{Declaration, StyleState, visual_state_pseudo_classes};
use crate::trace::FlushEvent;

impl<P: Platform> ViewTree<P> {
    // -- Classes and pseudo-classes --

    /// Adds a pseudo-class. A real change invalidates the subtree's style.
    pub fn add_pseudo_class(&mut self, id: ViewId, name: &str) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        if self.nodes[idx as usize].style.add_pseudo_class(name) {
            self.batch_update(|tree| tree.invalidate_style_at(idx));
        }
        Ok(())
    }

    /// Removes a pseudo-class. A real change invalidates the subtree's style.
    pub fn delete_pseudo_class(&mut self, id: ViewId, name: &str) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        if self.nodes[idx as usize].style.delete_pseudo_class(name) {
            self.batch_update(|tree| tree.invalidate_style_at(idx));
        }
        Ok(())
    }

    /// Adds a class to the persistent class set.
    pub fn add_css_class(&mut self, id: ViewId, name: &str) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        if self.nodes[idx as usize].style.add_class(name) {
            self.batch_update(|tree| tree.invalidate_style_at(idx));
        }
        Ok(())
    }

    /// Removes a class from the persistent class set.
    pub fn remove_css_class(&mut self, id: ViewId, name: &str) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        if self.nodes[idx as usize].style.remove_class(name) {
            self.batch_update(|tree| tree.invalidate_style_at(idx));
        }
        Ok(())
    }

    /// Returns whether a view carries a class.
    #[must_use]
    pub fn has_css_class(&self, id: ViewId, name: &str) -> bool {
        self.validate(id)
            .is_ok_and(|idx| self.nodes[idx as usize].style.has_class(name))
    }

    /// Returns the class text last given to
    /// [`set_class_name`](Self::set_class_name).
    #[must_use]
    pub fn class_name(&self, id: ViewId) -> Option<&str> {
        let idx = self.validate(id).ok()?;
        self.nodes[idx as usize].class_name.as_deref()
    }

    /// Replaces the class set with the whitespace-separated names in
    /// `class_name`.
    pub fn set_class_name(
        &mut self,
        id: ViewId,
        class_name: Option<&str>,
    ) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let node = &mut self.nodes[idx as usize];
        let renamed = node.class_name.as_deref() != class_name;
        node.class_name = class_name.map(ToString::to_string);
        let changed = node.style.set_class_list(class_name.unwrap_or_default());
        if renamed || changed {
            self.batch_update(|tree| tree.invalidate_style_at(idx));
        }
        Ok(())
    }

    /// Sets (or with `None`, clears) the inline style text.
    pub fn set_inline_style(&mut self, id: ViewId, text: Option<&str>) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        if self.nodes[idx as usize].style.set_inline(text) {
            self.batch_update(|tree| tree.invalidate_style_at(idx));
        }
        Ok(())
    }

    /// Switches the view to a named visual state.
    ///
    /// The previous state's pseudo-classes are removed and the new state's
    /// added inside one batch scope, so matching never sees a partial set.
    pub fn go_to_visual_state(&mut self, id: ViewId, state: &str) -> Result<(), TreeError> {
        let idx = self.validate(id)?;
        let next = visual_state_pseudo_classes(state);
        self.batch_update(|tree| {
            if tree.nodes[idx as usize].style.replace_visual_state(next) {
                tree.invalidate_style_at(idx);
            }
        });
        Ok(())
    }

    /// Returns the style state of a view.
    #[must_use]
    pub fn style(&self, id: ViewId) -> Option<&StyleState> {
        let idx = self.validate(id).ok()?;
        Some(&self.nodes[idx as usize].style)
    }

    /// Returns the declarations of the last cascade, in application order.
    #[must_use]
    pub fn computed_style(&self, id: ViewId) -> Option<&[Declaration]> {
        let idx = self.validate(id).ok()?;
        Some(&self.nodes[idx as usize].computed)
    }

    /// Returns whether the view or one of its ancestors resolved
    /// `visibility` to collapsed.
    #[must_use]
    pub fn is_collapsed(&self, id: ViewId) -> bool {
        let Ok(mut idx) = self.validate(id) else {
            return false;
        };
        while idx != INVALID {
            if self.nodes[idx as usize].style.collapsed {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    // -- Deferred work --

    /// Marks the style of `idx` and its whole subtree dirty.
    pub(crate) fn invalidate_style_at(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::STYLE, &EagerPolicy);
    }

    /// Drains the style and layout channels.
    pub(crate) fn flush(&mut self) {
        // Mutations made while draining must not flush recursively.
        self.batch.enter();
        let mut round = 0_u8;
        loop {
            if round == self.config.max_flush_rounds {
                tracing::warn!(
                    rounds = round,
                    "flush round limit reached, remaining marks deferred"
                );
                break;
            }
            let styled: Vec<u32> = self
                .dirty
                .drain(dirty::STYLE)
                .affected()
                .deterministic()
                .run()
                .collect();
            if !styled.is_empty() {
                self.style_passes += 1;
            }
            for &idx in &styled {
                if self.alive[idx as usize] {
                    self.recompute_style(idx);
                }
            }

            let laid_out: Vec<u32> = self
                .dirty
                .drain(dirty::LAYOUT)
                .deterministic()
                .run()
                .collect();
            if !laid_out.is_empty() {
                self.layout_passes += 1;
            }
            for &idx in &laid_out {
                if !self.alive[idx as usize] {
                    continue;
                }
                let node = &mut self.nodes[idx as usize];
                if let Some(peer) = node.native.peer.as_mut() {
                    node.widget.request_native_layout(peer, &mut self.context);
                }
                let view = self.handle(idx);
                if !self.layout_requests.contains(&view) {
                    self.layout_requests.push(view);
                }
            }

            if styled.is_empty() && laid_out.is_empty() {
                break;
            }
            self.tracer.flush(&FlushEvent {
                round,
                styled: u32::try_from(styled.len()).unwrap_or(u32::MAX),
                laid_out: u32::try_from(laid_out.len()).unwrap_or(u32::MAX),
            });
            round += 1;
        }
        self.batch.exit();
    }

    fn style_target(&self, idx: u32) -> StyleTarget<'_> {
        let node = &self.nodes[idx as usize];
        StyleTarget {
            view: self.handle(idx),
            type_name: node.widget.type_name(),
            id: node.id.as_deref(),
            classes: node.style.classes().iter().map(|c| c.as_str()).collect(),
            pseudo_classes: node
                .style
                .pseudo_classes()
                .iter()
                .map(|c| c.as_str())
                .collect(),
        }
    }

    /// Recomputes the cascade of one view and pushes a changed result to its
    /// peer.
    fn recompute_style(&mut self, idx: u32) {
        let view = self.handle(idx);
        let mut cascade = Vec::new();
        let mut pseudo = Vec::new();
        if let Some(matcher) = self.matcher.as_deref() {
            let target = self.style_target(idx);
            let mut ancestors = Vec::new();
            let mut p = self.parent[idx as usize];
            while p != INVALID {
                ancestors.push(self.style_target(p));
                p = self.parent[p as usize];
            }
            for matched in matcher.matched_declarations(&target, &ancestors) {
                if matched.from_pseudo_class {
                    pseudo.push(matched.declaration);
                } else {
                    cascade.push(matched.declaration);
                }
            }
        }
        cascade.extend_from_slice(self.nodes[idx as usize].style.inline_declarations());
        cascade.extend(pseudo);
        let cascade = collapse_duplicates(cascade);

        self.resolver.replace_styled(view, &cascade);
        let visibility = self.resolver.get(&[view], "visibility");
        let collapsed = matches!(visibility.as_deref(), Some("collapse" | "collapsed"));

        let node = &mut self.nodes[idx as usize];
        node.style.collapsed = collapsed;
        if node.computed == cascade {
            return;
        }
        node.computed = cascade;
        if let Some(peer) = node.native.peer.as_mut() {
            node.widget
                .apply_properties(peer, &node.computed, &mut self.context);
        }
        self.dirty.mark(idx, dirty::LAYOUT);
    }
}

/// Keeps the last declaration of each property, in the position it was
/// declared.
fn collapse_duplicates(declarations: Vec<Declaration>) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::with_capacity(declarations.len());
    for declaration in declarations {
        out.retain(|d| d.property != declaration.property);
        out.push(declaration);
    }
    out
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;

    use super::*;
    use crate::host::{MatchedDeclaration, StyleMatcher};
    use crate::test_support::{Call, TestPage, TestPlatform, TestWidget, tree};

    /// Matches `.warn` and `:pressed` on any view.
    #[derive(Debug)]
    struct Sheet;

    impl StyleMatcher for Sheet {
        fn matched_declarations(
            &self,
            target: &StyleTarget<'_>,
            _ancestors: &[StyleTarget<'_>],
        ) -> Vec<MatchedDeclaration> {
            let mut out = Vec::new();
            if target.classes.contains(&"warn") {
                out.push(MatchedDeclaration {
                    declaration: Declaration::new("color", "orange"),
                    from_pseudo_class: false,
                });
            }
            if target.pseudo_classes.contains(&"pressed") {
                out.push(MatchedDeclaration {
                    declaration: Declaration::new("color", "black"),
                    from_pseudo_class: true,
                });
            }
            if target.classes.contains(&"gone") {
                out.push(MatchedDeclaration {
                    declaration: Declaration::new("visibility", "collapse"),
                    from_pseudo_class: false,
                });
            }
            out
        }
    }

    fn values(tree: &ViewTree<TestPlatform>, id: ViewId) -> Vec<(String, String)> {
        tree.computed_style(id)
            .unwrap()
            .iter()
            .map(|d| (d.property.clone(), d.value.clone()))
            .collect()
    }

    #[test]
    fn inline_sits_between_plain_and_pseudo_declarations() {
        let mut tree = tree().with_style_matcher(Box::new(Sheet));
        let label = tree.create_view(TestWidget::new("Label"));
        tree.set_class_name(label, Some("warn")).unwrap();
        tree.set_inline_style(label, Some("color: red; width: 4"))
            .unwrap();
        assert_eq!(tree.property(label, "color").as_deref(), Some("red"));

        tree.go_to_visual_state(label, "pressed").unwrap();
        assert_eq!(tree.property(label, "color").as_deref(), Some("black"));
        assert!(tree.style(label).unwrap().has_pseudo_class("highlighted"));

        tree.go_to_visual_state(label, "normal").unwrap();
        assert!(tree.style(label).unwrap().pseudo_classes().is_empty());
        assert_eq!(
            values(&tree, label),
            vec![
                ("color".into(), "red".into()),
                ("width".into(), "4".into())
            ]
        );
    }

    #[test]
    fn pseudo_class_changes_are_idempotent() {
        let mut tree = tree();
        let label = tree.create_view(TestWidget::new("Label"));
        tree.add_pseudo_class(label, "focus").unwrap();
        let passes = tree.style_pass_count();
        tree.add_pseudo_class(label, "focus").unwrap();
        assert_eq!(tree.style_pass_count(), passes, "no change, no recompute");
        tree.delete_pseudo_class(label, "focus").unwrap();
        assert!(!tree.style(label).unwrap().has_pseudo_class("focus"));
        assert_eq!(tree.style_pass_count(), passes + 1);
    }

    #[test]
    fn class_set_has_no_duplicates() {
        let mut tree = tree();
        let label = tree.create_view(TestWidget::new("Label"));
        tree.set_class_name(label, Some("a b a")).unwrap();
        tree.add_css_class(label, "b").unwrap();
        assert_eq!(tree.style(label).unwrap().classes().len(), 2);
        tree.remove_css_class(label, "a").unwrap();
        assert!(!tree.has_css_class(label, "a"));
        assert!(tree.has_css_class(label, "b"));
        assert_eq!(tree.class_name(label), Some("a b a"));
    }

    #[test]
    fn collapsed_is_inherited_by_descendants() {
        let mut tree = tree().with_style_matcher(Box::new(Sheet));
        let stack = tree.create_view(TestWidget::new("Stack"));
        let label = tree.create_view(TestWidget::new("Label"));
        tree.add_child(stack, label).unwrap();
        assert!(!tree.is_collapsed(label));
        tree.add_css_class(stack, "gone").unwrap();
        assert!(tree.is_collapsed(label));
        assert!(!tree.style(label).unwrap().collapsed());
    }

    #[test]
    fn reparenting_restyles_subtree() {
        let mut tree = tree();
        let a = tree.create_view(TestWidget::new("Stack"));
        let b = tree.create_view(TestWidget::new("Stack"));
        let c = tree.create_view(TestWidget::new("Label"));
        tree.add_child(b, c).unwrap();
        let passes = tree.style_pass_count();
        tree.add_child(a, b).unwrap();
        assert_eq!(tree.style_pass_count(), passes + 1);
    }

    #[test]
    fn changed_style_reaches_the_peer() {
        let mut tree = tree();
        let page = tree.create_view(TestPage);
        let label = tree.create_view(TestWidget::new("Label"));
        tree.add_child(page, label).unwrap();
        tree.attach_page(page).unwrap();
        let peer = *tree.native_peer(label).unwrap();
        tree.context_mut().calls.clear();

        tree.set_inline_style(label, Some("opacity: 0.5")).unwrap();
        assert!(tree.context().calls.contains(&Call::Apply(
            peer,
            vec![Declaration::new("opacity", "0.5")]
        )));
        assert!(tree.context().calls.contains(&Call::Layout(peer)));
    }

    #[test]
    fn duplicates_keep_the_last_value() {
        let collapsed = collapse_duplicates(vec![
            Declaration::new("color", "red"),
            Declaration::new("width", "1"),
            Declaration::new("color", "blue"),
        ]);
        assert_eq!(
            collapsed,
            vec![Declaration::new("width", "1"), Declaration::new("color", "blue")]
        );
    }
}
