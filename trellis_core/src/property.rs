// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference [`PropertyResolver`] with local, styled, and inherited tiers.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::host::{PropertyResolver, ValueSource};
use crate::style::Declaration;
use crate::view::ViewId;

/// Properties inherited from ancestors unless set locally or by style.
pub const DEFAULT_INHERITED: &[&str] = &[
    "color",
    "direction",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "line-height",
    "text-align",
    "text-transform",
];

/// A change of a view's own (local or styled) effective value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyChange<'a> {
    /// The view whose value changed.
    pub view: ViewId,
    /// Property name.
    pub property: &'a str,
    /// Previous value.
    pub old: Option<&'a str>,
    /// New value.
    pub new: Option<&'a str>,
}

/// Callback registered with [`TieredResolver::subscribe`].
pub type ChangeCallback = Box<dyn FnMut(&PropertyChange<'_>)>;

type Values = HashMap<String, String>;

/// In-memory resolver storing a local and a styled map per view.
#[derive(Default)]
pub struct TieredResolver {
    local: HashMap<ViewId, Values>,
    styled: HashMap<ViewId, Values>,
    inherited: HashSet<String>,
    subscribers: Vec<ChangeCallback>,
}

impl fmt::Debug for TieredResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredResolver")
            .field("local", &self.local)
            .field("styled", &self.styled)
            .field("inherited", &self.inherited)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TieredResolver {
    /// Creates a resolver that inherits [`DEFAULT_INHERITED`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_inherited(DEFAULT_INHERITED.iter().copied())
    }

    /// Creates a resolver that inherits exactly the given properties.
    pub fn with_inherited<'a>(properties: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            inherited: properties.into_iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Registers a callback for changes of a view's own effective values.
    pub fn subscribe(&mut self, callback: ChangeCallback) {
        self.subscribers.push(callback);
    }

    /// Returns whether `property` falls back to ancestors.
    #[must_use]
    pub fn is_inherited(&self, property: &str) -> bool {
        self.inherited.contains(property)
    }

    fn own_value(&self, view: ViewId, property: &str) -> Option<&str> {
        self.local
            .get(&view)
            .and_then(|values| values.get(property))
            .or_else(|| self.styled.get(&view).and_then(|values| values.get(property)))
            .map(String::as_str)
    }

    fn notify(&mut self, view: ViewId, property: &str, old: Option<&str>, new: Option<&str>) {
        if old == new {
            return;
        }
        let change = PropertyChange {
            view,
            property,
            old,
            new,
        };
        for subscriber in &mut self.subscribers {
            subscriber(&change);
        }
    }
}

impl PropertyResolver for TieredResolver {
    fn get(&self, lineage: &[ViewId], property: &str) -> Option<String> {
        let (view, ancestors) = lineage.split_first()?;
        if let Some(value) = self.own_value(*view, property) {
            return Some(value.to_string());
        }
        if !self.is_inherited(property) {
            return None;
        }
        ancestors
            .iter()
            .find_map(|ancestor| self.own_value(*ancestor, property))
            .map(ToString::to_string)
    }

    fn set(&mut self, view: ViewId, property: &str, value: Option<&str>, source: ValueSource) {
        let old = self.own_value(view, property).map(ToString::to_string);
        let tier = match source {
            ValueSource::Local => &mut self.local,
            ValueSource::Styled => &mut self.styled,
            // Inherited values are derived, never stored.
            ValueSource::Inherited => return,
        };
        match value {
            Some(value) => {
                tier.entry(view)
                    .or_default()
                    .insert(property.to_string(), value.to_string());
            }
            None => {
                if let Some(values) = tier.get_mut(&view) {
                    values.remove(property);
                }
            }
        }
        let new = self.own_value(view, property).map(ToString::to_string);
        self.notify(view, property, old.as_deref(), new.as_deref());
    }

    fn replace_styled(&mut self, view: ViewId, declarations: &[Declaration]) {
        let mut next = Values::new();
        for declaration in declarations {
            next.insert(declaration.property.clone(), declaration.value.clone());
        }
        let mut touched: Vec<String> = next.keys().cloned().collect();
        if let Some(previous) = self.styled.get(&view) {
            touched.extend(previous.keys().filter(|k| !next.contains_key(*k)).cloned());
        }
        let before: Vec<Option<String>> = touched
            .iter()
            .map(|p| self.own_value(view, p).map(ToString::to_string))
            .collect();
        self.styled.insert(view, next);
        for (property, old) in touched.iter().zip(before) {
            let new = self.own_value(view, property).map(ToString::to_string);
            self.notify(view, property, old.as_deref(), new.as_deref());
        }
    }

    fn forget(&mut self, view: ViewId) {
        self.local.remove(&view);
        self.styled.remove(&view);
    }
}
