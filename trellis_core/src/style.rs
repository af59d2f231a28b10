// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS class, pseudo-class, and inline style state of a view.
//!
//! [`StyleState`] only records what a view *is* for matching purposes. The
//! tree decides when a change needs a cascade recomputation and marks the
//! [`STYLE`](crate::dirty::STYLE) channel accordingly.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashSet;

/// A single `property: value` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// Property name, trimmed and lower-cased.
    pub property: String,
    /// Property value, trimmed.
    pub value: String,
}

impl Declaration {
    /// Creates a declaration.
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Parses inline style text of the form `prop: value; prop2: value2`.
///
/// Empty fragments are ignored. Fragments without a `:` or with an empty
/// property name are skipped with a warning.
#[must_use]
pub fn parse_inline_style(text: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for fragment in text.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let Some((property, value)) = fragment.split_once(':') else {
            tracing::warn!(fragment, "skipping inline style fragment without ':'");
            continue;
        };
        let property = property.trim();
        if property.is_empty() {
            tracing::warn!(fragment, "skipping inline style fragment without a property");
            continue;
        }
        declarations.push(Declaration::new(
            property.to_ascii_lowercase(),
            value.trim(),
        ));
    }
    declarations
}

/// Returns the canonical pseudo-classes for a named visual state.
///
/// `normal` clears every visual-state pseudo-class. Unknown names map to a
/// pseudo-class of the same name.
#[must_use]
pub fn visual_state_pseudo_classes(state: &str) -> Vec<String> {
    let canonical: &[&str] = match state {
        "normal" => &[],
        "highlighted" | "pressed" => &["highlighted", "pressed"],
        "focused" => &["focus"],
        "disabled" => &["disabled"],
        other => return alloc::vec![other.to_string()],
    };
    canonical.iter().map(|s| (*s).to_string()).collect()
}

/// Class, pseudo-class, and inline style state of one view.
#[derive(Clone, Debug, Default)]
pub struct StyleState {
    classes: HashSet<String>,
    pseudo_classes: HashSet<String>,
    inline_text: Option<String>,
    inline: Vec<Declaration>,
    visual_state: Vec<String>,
    pub(crate) collapsed: bool,
}

impl StyleState {
    /// Returns whether `name` is in the persistent class set.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// Returns the persistent class set.
    #[must_use]
    pub fn classes(&self) -> &HashSet<String> {
        &self.classes
    }

    /// Returns whether `name` is in the pseudo-class set.
    #[must_use]
    pub fn has_pseudo_class(&self, name: &str) -> bool {
        self.pseudo_classes.contains(name)
    }

    /// Returns the pseudo-class set.
    #[must_use]
    pub fn pseudo_classes(&self) -> &HashSet<String> {
        &self.pseudo_classes
    }

    /// Returns the raw inline style text, if any.
    #[must_use]
    pub fn inline_text(&self) -> Option<&str> {
        self.inline_text.as_deref()
    }

    /// Returns the parsed inline declarations.
    #[must_use]
    pub fn inline_declarations(&self) -> &[Declaration] {
        &self.inline
    }

    /// Returns whether the last cascade resolved `visibility` to collapsed.
    #[must_use]
    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    /// Replaces the class set with the whitespace-separated names in
    /// `class_name`. Returns whether the set changed.
    pub(crate) fn set_class_list(&mut self, class_name: &str) -> bool {
        let next: HashSet<String> = class_name
            .split_whitespace()
            .map(ToString::to_string)
            .collect();
        if next == self.classes {
            return false;
        }
        self.classes = next;
        true
    }

    pub(crate) fn add_class(&mut self, name: &str) -> bool {
        self.classes.insert(name.to_string())
    }

    pub(crate) fn remove_class(&mut self, name: &str) -> bool {
        self.classes.remove(name)
    }

    pub(crate) fn add_pseudo_class(&mut self, name: &str) -> bool {
        self.pseudo_classes.insert(name.to_string())
    }

    pub(crate) fn delete_pseudo_class(&mut self, name: &str) -> bool {
        self.pseudo_classes.remove(name)
    }

    /// Swaps the previous visual state's pseudo-classes for `next`. Returns
    /// whether the pseudo-class set changed.
    pub(crate) fn replace_visual_state(&mut self, next: Vec<String>) -> bool {
        let mut changed = false;
        for old in core::mem::take(&mut self.visual_state) {
            if !next.contains(&old) {
                changed |= self.pseudo_classes.remove(&old);
            }
        }
        for name in &next {
            changed |= self.pseudo_classes.insert(name.clone());
        }
        self.visual_state = next;
        changed
    }

    /// Stores inline style text and its parsed declarations. Returns whether
    /// the declarations changed.
    pub(crate) fn set_inline(&mut self, text: Option<&str>) -> bool {
        let parsed = text.map(parse_inline_style).unwrap_or_default();
        self.inline_text = text.map(ToString::to_string);
        if parsed == self.inline {
            return false;
        }
        self.inline = parsed;
        true
    }
}
