//! Allowlist-driven XSS filter over an in-memory DOM tree.
//!
//! The sanitizer mutates the tree in place. Disallowed wrapper tags are
//! removed but their children are hoisted into their place; tags whose
//! content is itself dangerous (`script`, `style`, ...) are removed along
//! with every descendant. Non-element, non-text nodes (comments, processing
//! instructions, doctypes, nested documents) have no business in sanitized
//! client-generated content and are removed outright.

use std::{collections::HashSet, path::Path};

use kuchikikiki::{ElementData, NodeData, NodeRef};
use serde::{Deserialize, Serialize};
use tendril::TendrilSink as _;

use crate::error::FilterError;

/// Tags that are deleted together with all of their descendants when not
/// explicitly allowed, instead of having their children hoisted.
const DROP_CONTENT_TAGS: &[&str] =
  &["script", "style", "textarea", "xmp", "plaintext"];

/// What the sanitizer keeps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizePolicy {
  /// Lowercase tag names allowed to remain in the tree.
  pub tags: HashSet<String>,

  /// Lowercase attribute names. With `attributes_are_denylist = false`
  /// (the default) this is the set of attributes kept on allowed elements;
  /// with `true` the test is inverted and listed attributes are stripped.
  pub attributes: HashSet<String>,

  /// Invert the attribute test (see `attributes`).
  pub attributes_are_denylist: bool,
}

impl SanitizePolicy {
  /// Policy that keeps no tags and no attributes. Sanitizing with this
  /// reduces a tree to its text content.
  #[must_use]
  pub fn none() -> Self {
    Self::default()
  }

  /// The usual formatting-tag allowlist for client-supplied rich text:
  /// structural and inline formatting tags, links, and nothing that can
  /// carry script or style.
  #[must_use]
  pub fn basic_text() -> Self {
    let tags = [
      "a", "b", "blockquote", "br", "code", "dd", "div", "dl", "dt", "em",
      "h2", "h3", "h4", "h5", "h6", "hr", "i", "li", "ol", "p", "pre", "q",
      "s", "small", "span", "strong", "sub", "sup", "u", "ul",
    ];
    let attributes = ["href", "title", "cite", "alt"];

    Self {
      tags: tags.iter().map(ToString::to_string).collect(),
      attributes: attributes.iter().map(ToString::to_string).collect(),
      attributes_are_denylist: false,
    }
  }

  /// Load a policy from a JSON file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or if the JSON is invalid.
  pub fn from_json_file(path: &Path) -> Result<Self, FilterError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
  }
}

/// Sanitize the subtree under `node` in place according to `policy`.
///
/// `node` itself is treated as the container and is never removed.
pub fn sanitize(node: &NodeRef, policy: &SanitizePolicy) {
  sanitize_children(node, policy);
}

fn sanitize_children(parent: &NodeRef, policy: &SanitizePolicy) {
  // Snapshot the child list first; removal and splicing below must not
  // disturb the walk.
  let children: Vec<NodeRef> = parent.children().collect();

  for child in children {
    match child.data() {
      NodeData::Element(element) => {
        let tag = element.name.local.as_ref().to_ascii_lowercase();

        if policy.tags.contains(&tag) {
          filter_attributes(element, policy);
          sanitize_children(&child, policy);
        } else if DROP_CONTENT_TAGS.contains(&tag.as_str()) {
          child.detach();
        } else {
          // Keep the content, discard only the wrapping tag.
          sanitize_children(&child, policy);
          for grandchild in child.children().collect::<Vec<_>>() {
            child.insert_before(grandchild);
          }
          child.detach();
        }
      },
      NodeData::Text(_) => {},
      _ => child.detach(),
    }
  }
}

fn filter_attributes(element: &ElementData, policy: &SanitizePolicy) {
  let mut attributes = element.attributes.borrow_mut();
  attributes.map.retain(|name, _| {
    let listed = policy
      .attributes
      .contains(&name.local.as_ref().to_ascii_lowercase());
    if policy.attributes_are_denylist {
      !listed
    } else {
      listed
    }
  });
}

/// Reduce an HTML string to its plain text content.
///
/// Parses the string, runs the sanitizer with the empty policy (every tag
/// removed, dangerous tag bodies dropped), and collects the remaining text.
/// Used when a token replacement destined for an attribute value turns out
/// to contain markup.
#[must_use]
pub fn strip_markup(html: &str) -> String {
  if !html.contains('<') {
    return html.to_string();
  }

  let document = kuchikikiki::parse_html().one(html);
  document.select_first("body").map_or_else(
    |()| html.to_string(),
    |body| {
      sanitize(body.as_node(), &SanitizePolicy::none());
      body.as_node().text_contents()
    },
  )
}
