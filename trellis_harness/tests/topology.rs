// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural rules of the view tree.

use trellis_core::config::TreeConfig;
use trellis_core::error::TreeError;
use trellis_core::view::{AncestorCriterion, ViewId, ViewTree};
use trellis_harness::{HeadlessPlatform, Label, Page, Stack, headless_tree};

fn chain(tree: &mut ViewTree<HeadlessPlatform>) -> (ViewId, ViewId, ViewId) {
    let a = tree.create_view(Stack);
    let b = tree.create_view(Stack);
    let c = tree.create_view(Label::new("c"));
    tree.add_child(a, b).unwrap();
    tree.add_child(b, c).unwrap();
    tree.set_id(a, Some("a")).unwrap();
    tree.set_id(b, Some("b")).unwrap();
    tree.set_id(c, Some("c")).unwrap();
    (a, b, c)
}

#[test]
fn view_by_id_searches_pre_order_including_root() {
    let mut tree = headless_tree(TreeConfig::default());
    let (a, _, c) = chain(&mut tree);
    assert_eq!(tree.get_view_by_id(a, "c"), Some(c));
    assert_eq!(tree.get_view_by_id(a, "a"), Some(a));
    assert_eq!(tree.get_view_by_id(a, "z"), None);
}

#[test]
fn view_by_id_returns_first_match() {
    let mut tree = headless_tree(TreeConfig::default());
    let root = tree.create_view(Stack);
    let first = tree.create_view(Stack);
    let nested = tree.create_view(Label::new("nested"));
    let second = tree.create_view(Label::new("second"));
    tree.add_child(root, first).unwrap();
    tree.add_child(first, nested).unwrap();
    tree.add_child(root, second).unwrap();
    tree.set_id(nested, Some("dup")).unwrap();
    tree.set_id(second, Some("dup")).unwrap();
    assert_eq!(tree.get_view_by_id(root, "dup"), Some(nested));
}

#[test]
fn cycles_are_rejected() {
    let mut tree = headless_tree(TreeConfig::default());
    let (a, b, c) = chain(&mut tree);

    tree.remove_child(b, c).unwrap();
    // c → a → b
    tree.add_child(c, a).unwrap();
    assert!(matches!(
        tree.add_child(b, c),
        Err(TreeError::InvalidOperation(_))
    ));
    assert!(matches!(
        tree.add_child(a, c),
        Err(TreeError::InvalidOperation(_))
    ));
    assert_eq!(tree.parent(c), None);
    assert_eq!(tree.parent(a), Some(c));
    assert_eq!(tree.parent(b), Some(a));
}

#[test]
fn second_parent_is_rejected_without_mutation() {
    let mut tree = headless_tree(TreeConfig::default());
    let (a, b, c) = chain(&mut tree);
    let other = tree.create_view(Stack);

    assert!(matches!(
        tree.add_child(other, c),
        Err(TreeError::InvalidOperation(_))
    ));
    assert_eq!(tree.parent(c), Some(b));
    assert_eq!(tree.child_count(other), 0);
    assert_eq!(tree.children(a).collect::<Vec<_>>(), [b]);
}

#[test]
fn removing_a_non_child_is_not_found() {
    let mut tree = headless_tree(TreeConfig::default());
    let (a, _, c) = chain(&mut tree);
    assert_eq!(tree.remove_child(a, c), Err(TreeError::NotFound));
}

#[test]
fn attached_page_cannot_become_a_child() {
    let mut tree = headless_tree(TreeConfig::default());
    let page = tree.create_view(Page::default());
    let stack = tree.create_view(Stack);
    tree.attach_page(page).unwrap();
    assert!(matches!(
        tree.add_child(stack, page),
        Err(TreeError::InvalidOperation(_))
    ));
}

#[test]
fn each_child_stops_when_visitor_declines() {
    let mut tree = headless_tree(TreeConfig::default());
    let root = tree.create_view(Stack);
    let kids: Vec<_> = (0..3)
        .map(|i| tree.create_view(Label::new(format!("k{i}"))))
        .collect();
    for &kid in &kids {
        tree.add_child(root, kid).unwrap();
    }

    let mut visited = Vec::new();
    tree.each_child(root, |id| {
        visited.push(id);
        false
    });
    assert_eq!(visited, [kids[0]]);

    let mut all = Vec::new();
    tree.each_descendant(root, |id| {
        all.push(id);
        true
    });
    assert_eq!(all, kids);
}

#[test]
fn ancestors_resolve_by_type_and_name() {
    let mut tree = headless_tree(TreeConfig::default());
    let page = tree.create_view(Page::default());
    let (a, b, c) = chain(&mut tree);
    tree.add_child(page, a).unwrap();

    assert_eq!(tree.get_ancestor(c, AncestorCriterion::of::<Page>()), Some(page));
    assert_eq!(tree.get_ancestor(c, AncestorCriterion::of::<Stack>()), Some(b));
    assert_eq!(tree.get_ancestor(c, AncestorCriterion::Name("StackLayout")), Some(b));
    assert_eq!(tree.get_ancestor(c, AncestorCriterion::Name("Grid")), None);
}

#[test]
fn destroy_invalidates_the_subtree() {
    let mut tree = headless_tree(TreeConfig::default());
    let page = tree.create_view(Page::default());
    let (a, b, c) = chain(&mut tree);
    tree.add_child(page, a).unwrap();
    tree.attach_page(page).unwrap();
    assert_eq!(tree.context().live_count(), 4);

    tree.destroy_view(b).unwrap();
    assert!(!tree.is_alive(b));
    assert!(!tree.is_alive(c));
    assert_eq!(tree.context().live_count(), 2);
    assert_eq!(tree.set_id(c, Some("x")), Err(TreeError::StaleView(c)));
    assert_eq!(tree.get_view_by_id(page, "c"), None);

    let reused = tree.create_view(Label::new("fresh"));
    assert!(tree.is_alive(reused));
    assert!(!tree.is_alive(b) && !tree.is_alive(c));
}

#[test]
fn parent_changes_reach_the_widget() {
    let mut tree = headless_tree(TreeConfig::default());
    let stack = tree.create_view(Stack);
    let label = tree.create_view(Label::new("l"));
    tree.add_child(stack, label).unwrap();
    tree.remove_from_parent(label).unwrap();
    tree.remove_from_parent(label).unwrap();
    assert_eq!(tree.widget::<Label>(label).unwrap().parent_changes, 2);
}
