//! Type definitions for the text filter.
//!
//! Contains the configuration options (`FilterOptions`), the main filter
//! struct (`TextFilter`), and the options builder.

use serde::{Deserialize, Serialize};

use crate::{
  html,
  resolver::{ResolveContext, ResolverChain, TokenResolver},
  state::ExpansionTracker,
  token::{Resolution, Token},
};

/// Options for configuring the text filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
  /// Wrap resolved tokens in a `<span>`/`<div class="filter-token">`
  /// carrying the original token source, so an editing UI can map rendered
  /// text back to the token that produced it. Attribute values are never
  /// wrapped regardless of this flag.
  pub edit_mode: bool,

  /// How deep nested tokens in argument position may chain before the
  /// candidate is treated as literal text.
  pub max_nested_depth: usize,
}

impl Default for FilterOptions {
  fn default() -> Self {
    Self {
      edit_mode:        false,
      max_nested_depth: 16,
    }
  }
}

/// Builder for constructing `FilterOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct FilterOptionsBuilder {
  options: FilterOptions,
}

impl FilterOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable edit-mode wrapping.
  #[must_use]
  pub const fn edit_mode(mut self, enabled: bool) -> Self {
    self.options.edit_mode = enabled;
    self
  }

  /// Set the nested-token depth limit.
  #[must_use]
  pub const fn max_nested_depth(mut self, depth: usize) -> Self {
    self.options.max_nested_depth = depth;
    self
  }

  /// Build the final `FilterOptions`.
  #[must_use]
  pub fn build(self) -> FilterOptions {
    self.options
  }
}

/// Main text filter.
///
/// Owns the resolver chain and the per-request recursion guard; one
/// instance is expected per logical render request. Construction is cheap,
/// so concurrent servers create one per request rather than sharing.
pub struct TextFilter {
  pub(crate) options:           FilterOptions,
  pub(crate) resolvers:         ResolverChain,
  pub(crate) inline_classifier: fn(&str) -> bool,
  pub(crate) expanding:         ExpansionTracker,
}

impl TextFilter {
  /// Create a new `TextFilter` with the given options and an empty
  /// resolver chain.
  #[must_use]
  pub fn new(options: FilterOptions) -> Self {
    Self {
      options,
      resolvers: ResolverChain::new(),
      inline_classifier: html::is_inline_tag,
      expanding: ExpansionTracker::new(),
    }
  }

  /// Append a resolver to the chain; earlier resolvers win.
  #[must_use]
  pub fn with_resolver(
    mut self,
    resolver: impl TokenResolver + 'static,
  ) -> Self {
    self.resolvers.push(resolver);
    self
  }

  /// Replace the whole resolver chain.
  #[must_use]
  pub fn with_chain(mut self, resolvers: ResolverChain) -> Self {
    self.resolvers = resolvers;
    self
  }

  /// Replace the inline-tag classifier used for edit-mode wrapping.
  #[must_use]
  pub fn with_inline_classifier(
    mut self,
    classifier: fn(&str) -> bool,
  ) -> Self {
    self.inline_classifier = classifier;
    self
  }

  /// Access filter options.
  #[must_use]
  pub const fn options(&self) -> &FilterOptions {
    &self.options
  }

  /// Run `token` through the resolver chain.
  pub(crate) fn resolve(
    &self,
    ctx: &ResolveContext<'_>,
    token: &Token,
  ) -> Resolution {
    self.resolvers.resolve(ctx, token)
  }

  pub(crate) fn inline_classifier(&self) -> fn(&str) -> bool {
    self.inline_classifier
  }

  pub(crate) const fn expanding(&self) -> &ExpansionTracker {
    &self.expanding
  }
}
