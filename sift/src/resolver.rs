//! Pluggable token resolution.
//!
//! Resolution is dynamic dispatch over an ordered chain: each resolver gets
//! a chance to recognize a token, and the first [`Resolution::Replaced`]
//! wins. A resolver that does not know a token answers
//! [`Resolution::Unknown`] and the chain moves on.

use kuchikikiki::NodeRef;

use crate::{
  filter::TextFilter,
  token::{Resolution, Token},
};

/// Context handed to every resolver invocation.
///
/// `page` is the identity of the page whose content is being scanned; for
/// nested sub-documents this is the identity carried by the innermost state
/// frame, not the outer document's. `filter` is the invoking [`TextFilter`],
/// so a resolver that renders an embedded page can recursively expand it
/// under the same recursion guard.
pub struct ResolveContext<'a> {
  /// Identity of the page the scanned content belongs to.
  pub page:     &'a str,
  /// The document being scanned, when the scan runs over a DOM tree.
  pub document: Option<&'a NodeRef>,
  /// The filter driving this scan.
  pub filter:   &'a TextFilter,
}

/// A single token resolution strategy.
///
/// Implementations must be side-effect-free with respect to the scan: they
/// may read external state, but must not mutate the document being scanned.
pub trait TokenResolver {
  /// Resolve `token` in `ctx`, or report [`Resolution::Unknown`].
  fn resolve(&self, ctx: &ResolveContext<'_>, token: &Token) -> Resolution;
}

impl<F> TokenResolver for F
where
  F: Fn(&ResolveContext<'_>, &Token) -> Resolution,
{
  fn resolve(&self, ctx: &ResolveContext<'_>, token: &Token) -> Resolution {
    self(ctx, token)
  }
}

/// An ordered list of resolvers tried in sequence.
#[derive(Default)]
pub struct ResolverChain {
  resolvers: Vec<Box<dyn TokenResolver>>,
}

impl ResolverChain {
  /// Create an empty chain. Every token resolves to
  /// [`Resolution::Unknown`] until resolvers are added.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a resolver to the end of the chain.
  pub fn push(&mut self, resolver: impl TokenResolver + 'static) {
    self.resolvers.push(Box::new(resolver));
  }

  /// Builder-style variant of [`ResolverChain::push`].
  #[must_use]
  pub fn with(mut self, resolver: impl TokenResolver + 'static) -> Self {
    self.push(resolver);
    self
  }

  /// Number of resolvers in the chain.
  #[must_use]
  pub fn len(&self) -> usize {
    self.resolvers.len()
  }

  /// `true` if no resolvers have been added.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.resolvers.is_empty()
  }
}

impl TokenResolver for ResolverChain {
  fn resolve(&self, ctx: &ResolveContext<'_>, token: &Token) -> Resolution {
    for resolver in &self.resolvers {
      if let Resolution::Replaced(text) = resolver.resolve(ctx, token) {
        return Resolution::Replaced(text);
      }
    }
    Resolution::Unknown
  }
}
