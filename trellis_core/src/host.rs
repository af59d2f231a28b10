// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts of the collaborators the tree consumes.
//!
//! - [`PropertyResolver`]: the property engine. The tree feeds it local
//!   values and style results and asks it for effective values.
//! - [`StyleMatcher`]: selector matching and specificity ordering.
//! - [`BindingEngine`]: binding expression evaluation.
//!
//! The tree only triggers these and applies their results. A reference
//! resolver lives in [`property`](crate::property).

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::TreeError;
use crate::style::Declaration;
use crate::view::ViewId;

/// Which tier a property value was set on.
///
/// Effective values resolve local, then styled, then inherited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Set directly on the view by application code.
    Local,
    /// Produced by the style cascade.
    Styled,
    /// Taken from the nearest ancestor that resolves the property.
    Inherited,
}

/// Resolves effective property values for views.
pub trait PropertyResolver {
    /// Resolves `property` for `lineage[0]`.
    ///
    /// `lineage` starts with the view itself followed by its ancestors,
    /// nearest first, so inherited properties can fall back up the chain.
    fn get(&self, lineage: &[ViewId], property: &str) -> Option<String>;

    /// Sets (or with `None`, clears) a value on the given tier.
    fn set(&mut self, view: ViewId, property: &str, value: Option<&str>, source: ValueSource);

    /// Replaces the whole styled tier of `view` with `declarations`.
    fn replace_styled(&mut self, view: ViewId, declarations: &[Declaration]);

    /// Drops every value stored for `view`.
    fn forget(&mut self, view: ViewId);
}

/// The matching-relevant state of one view.
#[derive(Clone, Debug)]
pub struct StyleTarget<'a> {
    /// The view.
    pub view: ViewId,
    /// Widget type name, matched by type selectors.
    pub type_name: &'static str,
    /// User-assigned id, matched by `#id` selectors.
    pub id: Option<&'a str>,
    /// Persistent CSS classes.
    pub classes: Vec<&'a str>,
    /// Active pseudo-classes.
    pub pseudo_classes: Vec<&'a str>,
}

/// A declaration returned by a [`StyleMatcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedDeclaration {
    /// The declaration.
    pub declaration: Declaration,
    /// Whether the matching selector depends on a pseudo-class.
    pub from_pseudo_class: bool,
}

/// Matches selectors against a view and its ancestors.
pub trait StyleMatcher {
    /// Returns the declarations that apply to `target`, ordered from lowest
    /// to highest precedence.
    ///
    /// `ancestors` lists the target's ancestors, nearest first.
    fn matched_declarations(
        &self,
        target: &StyleTarget<'_>,
        ancestors: &[StyleTarget<'_>],
    ) -> Vec<MatchedDeclaration>;
}

/// Options passed to [`BindingEngine::bind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingOptions {
    /// Property on the binding source.
    pub source_property: String,
    /// Property on the target view.
    pub target_property: String,
    /// Whether target changes flow back to the source.
    pub two_way: bool,
    /// Optional expression evaluated by the engine.
    pub expression: Option<String>,
}

impl BindingOptions {
    /// One-way binding between two properties.
    #[must_use]
    pub fn one_way(source_property: impl Into<String>, target_property: impl Into<String>) -> Self {
        Self {
            source_property: source_property.into(),
            target_property: target_property.into(),
            two_way: false,
            expression: None,
        }
    }
}

/// Evaluates bindings with a view as target.
pub trait BindingEngine {
    /// Establishes a binding.
    fn bind(&mut self, target: ViewId, options: &BindingOptions) -> Result<(), TreeError>;

    /// Removes the binding on `target_property`, if any.
    fn unbind(&mut self, target: ViewId, target_property: &str);
}
