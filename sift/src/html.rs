//! Small HTML helpers shared by the filtering passes.

use std::sync::LazyLock;

use kuchikikiki::NodeRef;
use log::error;
use regex::Regex;
use tendril::TendrilSink as _;

use crate::error::FilterError;

/// Encode `" < > & '` to their named entities.
///
/// Used for attribute sanitization fallback text and for the token source
/// embedded in the edit-mode wrapper's `token="..."` attribute.
#[must_use]
pub fn encode_entities(text: &str) -> String {
  html_escape::encode_safe(text).into_owned()
}

/// Tags rendered inline by every stock browser stylesheet.
///
/// Used to decide span vs div when wrapping an edit-mode replacement.
const INLINE_TAGS: &[&str] = &[
  "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data",
  "dfn", "em", "i", "img", "input", "kbd", "label", "mark", "q", "s", "samp",
  "select", "small", "span", "strong", "sub", "sup", "time", "u", "var",
  "wbr",
];

/// Default inline-tag classifier.
#[must_use]
pub fn is_inline_tag(name: &str) -> bool {
  let lower = name.to_ascii_lowercase();
  INLINE_TAGS.contains(&lower.as_str())
}

static FIRST_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<\s*([A-Za-z][A-Za-z0-9]*)").unwrap_or_else(|e| {
    error!("Failed to compile FIRST_TAG_RE regex: {e}");
    never_matching_regex()
  })
});

/// Name of the first HTML tag appearing in `html`, if any.
#[must_use]
pub fn first_tag_name(html: &str) -> Option<String> {
  FIRST_TAG_RE
    .captures(html)
    .map(|caps| caps[1].to_ascii_lowercase())
}

/// Parse an HTML fragment and return the nodes that end up under `<body>`.
///
/// The returned nodes are still attached to the throwaway document; callers
/// splice them wherever needed (insertion detaches them first).
#[must_use]
pub fn parse_body_fragment(html: &str) -> Vec<NodeRef> {
  let document = kuchikikiki::parse_html().one(html);
  document
    .select_first("body")
    .map(|body| body.as_node().children().collect())
    .unwrap_or_default()
}

/// Serialize a node (and its subtree) back to HTML.
///
/// # Errors
///
/// Returns an error when the underlying writer fails, which for the
/// in-memory buffer used here means allocation failure only.
pub fn to_html(node: &NodeRef) -> Result<String, FilterError> {
  let mut out = Vec::new();
  node.serialize(&mut out)?;
  Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Build an HTML element node with the given attributes.
#[must_use]
pub(crate) fn new_element(name: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    markup5ever::QualName::new(
      None,
      markup5ever::ns!(html),
      markup5ever::LocalName::from(name),
    ),
    attributes.iter().map(|(attr_name, value)| {
      (
        kuchikikiki::ExpandedName::new("", *attr_name),
        kuchikikiki::Attribute {
          prefix: None,
          value:  (*value).to_string(),
        },
      )
    }),
  )
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[allow(
  clippy::unwrap_used,
  reason = "Both fallback patterns are guaranteed to be valid"
)]
#[must_use]
pub(crate) fn never_matching_regex() -> Regex {
  // Use a pattern that will never match anything because it asserts something
  // impossible - this pattern is guaranteed to be valid
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    // As an ultimate fallback, use an empty pattern that matches nothing
    Regex::new(r"^\b$").unwrap()
  })
}
