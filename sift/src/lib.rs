//! # sift - content filtering for HTML pipelines
//!
//! Filtering core for a CMS content pipeline: expands an embedded
//! `[token(args)]` mini-language inside text and DOM documents, sanitizes
//! client-supplied HTML against tag/attribute allowlists, and reduces a
//! document body to a bounded teaser excerpt.
//!
//! ## Quick Start
//!
//! ```rust
//! use sift::{FilterOptions, Resolution, ResolveContext, TextFilter, Token};
//!
//! let filter = TextFilter::new(FilterOptions::default()).with_resolver(
//!   |_ctx: &ResolveContext<'_>, token: &Token| match token.name.as_str() {
//!     "site_name" => Resolution::Replaced("Example".to_string()),
//!     _ => Resolution::Unknown,
//!   },
//! );
//!
//! let text = filter.expand_text("page/home", "Welcome to [site_name]!");
//! assert_eq!(text, "Welcome to Example!");
//! ```
//!
//! ## Features
//!
//! - **All-or-nothing token parsing** with nested tokens in argument
//!   position and literal passthrough for anything malformed or unknown
//! - **Pluggable resolution** through an ordered [`ResolverChain`]
//! - **Request-scoped recursion guard** so self-referential pages cannot
//!   loop a render
//! - **Allowlist sanitizer** that hoists content out of disallowed
//!   wrapper tags and drops dangerous subtrees outright
//! - **Teaser reduction** with word/tag budgets and configurable end
//!   markers
//!
//! The sanitizer and the teaser reducer are independent passes over a
//! DOM tree parsed with `kuchikikiki`; see [`sanitize::sanitize`] and
//! [`teaser::reduce`].

pub mod error;
pub mod filter;
pub mod html;
pub mod names;
pub mod resolver;
pub mod sanitize;
pub mod state;
pub mod teaser;
pub mod token;

pub use crate::{
  error::FilterError,
  filter::{FilterOptions, FilterOptionsBuilder, TextFilter},
  names::{filter_filename, filter_uri},
  resolver::{ResolveContext, ResolverChain, TokenResolver},
  sanitize::{SanitizePolicy, sanitize, strip_markup},
  state::{ExpansionGuard, ExpansionTracker, StateFrame, StateStack},
  teaser::TeaserBudget,
  token::{ParamKind, Resolution, Token, TokenParam},
};
