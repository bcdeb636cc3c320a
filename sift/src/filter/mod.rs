//! Token scanning and expansion.
//!
//! The filter module is organized into focused submodules:
//!
//! - [`types`]: configuration options and the `TextFilter` struct
//! - `scan`: the character-level scanner for `[token(args)]` syntax
//! - `document`: the DOM pass feeding text nodes and attributes through
//!   the scanner
//!
//! # Examples
//!
//! ```rust
//! use sift::{FilterOptions, Resolution, TextFilter};
//!
//! let filter = TextFilter::new(FilterOptions::default()).with_resolver(
//!   |_ctx: &sift::ResolveContext<'_>, token: &sift::Token| {
//!     if token.name == "year" {
//!       Resolution::Replaced("2024".to_string())
//!     } else {
//!       Resolution::Unknown
//!     }
//!   },
//! );
//!
//! assert_eq!(filter.expand_text("page/home", "it is [year]."), "it is 2024.");
//! ```

mod document;
mod scan;
pub mod types;

use kuchikikiki::NodeRef;
use tendril::TendrilSink as _;

pub use self::types::{FilterOptions, FilterOptionsBuilder, TextFilter};
use crate::{error::FilterError, html, resolver::ResolveContext};

impl TextFilter {
  /// Expand every recognized token in a plain text buffer.
  ///
  /// Malformed candidates and tokens no resolver recognizes are reproduced
  /// verbatim. When `page` is already being expanded the text is returned
  /// unchanged (the recursion guard logs the error).
  #[must_use]
  pub fn expand_text(&self, page: &str, text: &str) -> String {
    let Some(_guard) = self.expanding().enter(page) else {
      return text.to_string();
    };

    let ctx = ResolveContext {
      page,
      document: None,
      filter: self,
    };
    scan::expand_in_text(&ctx, text, self.options().edit_mode)
  }

  /// Expand every recognized token in a parsed document, in place.
  ///
  /// Walks all text nodes and all attribute values except those on
  /// `xsl:`-prefixed elements. Returns `false` without touching the tree
  /// when `page` is already being expanded.
  pub fn expand_document(&self, page: &str, document: &NodeRef) -> bool {
    document::expand_dom(self, page, document)
  }

  /// Convenience wrapper: parse `html`, expand the document, serialize.
  ///
  /// # Errors
  ///
  /// Returns an error when serialization fails.
  pub fn expand_html(
    &self,
    page: &str,
    html: &str,
  ) -> Result<String, FilterError> {
    let document = kuchikikiki::parse_html().one(html);
    if !self.expand_document(page, &document) {
      return Ok(html.to_string());
    }
    html::to_html(&document)
  }
}

#[cfg(test)]
mod tests {
  use super::{FilterOptions, TextFilter};
  use crate::{
    resolver::ResolveContext,
    token::{Resolution, Token},
  };

  fn year_filter() -> TextFilter {
    TextFilter::new(FilterOptions::default()).with_resolver(
      |_ctx: &ResolveContext<'_>, token: &Token| {
        if token.name == "year" {
          Resolution::Replaced("2024".to_string())
        } else {
          Resolution::Unknown
        }
      },
    )
  }

  #[test]
  fn text_without_brackets_is_untouched() {
    let filter = year_filter();
    assert_eq!(filter.expand_text("p", "no tokens here"), "no tokens here");
  }

  #[test]
  fn basic_substitution() {
    let filter = year_filter();
    assert_eq!(filter.expand_text("p", "[year]"), "2024");
  }

  #[test]
  fn unknown_token_passes_through() {
    let filter = year_filter();
    assert_eq!(filter.expand_text("p", "a [bogus] b"), "a [bogus] b");
  }

  #[test]
  fn malformed_candidate_passes_through() {
    let filter = year_filter();
    assert_eq!(
      filter.expand_text("p", "[year(unclosed"),
      "[year(unclosed"
    );
    assert_eq!(filter.expand_text("p", "a [ b ] c"), "a [ b ] c");
  }

  #[test]
  fn dash_in_name_is_unresolvable() {
    let filter = year_filter();
    assert_eq!(
      filter.expand_text("p", "[the-year]"),
      "[the-year]"
    );
  }
}
