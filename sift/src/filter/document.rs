//! Token expansion over a parsed DOM tree.
//!
//! Walks every text node and attribute value of the document, feeding each
//! through the text scanner and writing expansions back into the tree.
//! Elements carrying `owner`/`path` attributes open a sub-document scope:
//! tokens under them resolve against the page identity the subtree was
//! rendered from, not the outer document's.

use kuchikikiki::{ElementData, ExpandedName, NodeRef};
use log::trace;

use super::{scan::expand_in_text, types::TextFilter};
use crate::{
  html::parse_body_fragment,
  resolver::ResolveContext,
  sanitize::strip_markup,
  state::{StateFrame, StateStack},
};

/// Expand every token in `document` for `page`.
///
/// Returns `false` without touching the tree when `page` is already being
/// expanded (a token loop); the recursion guard logs the error and the
/// render of the enclosing page continues.
pub(crate) fn expand_dom(
  filter: &TextFilter,
  page: &str,
  document: &NodeRef,
) -> bool {
  let Some(_guard) = filter.expanding().enter(page) else {
    return false;
  };

  trace!("expanding tokens in document for page \"{page}\"");

  let mut stack = StateStack::new(document.clone(), "", page);
  walk(filter, document, &mut stack, document);
  true
}

fn walk(
  filter: &TextFilter,
  document: &NodeRef,
  stack: &mut StateStack,
  node: &NodeRef,
) {
  // Snapshot: text expansion may splice fragments in place of children,
  // and spliced-in replacements must not be rescanned.
  let children: Vec<NodeRef> = node.children().collect();

  for child in children {
    if let Some(element) = child.as_element() {
      let frame = sub_document_frame(&child, element, stack);
      let entered = frame.is_some();
      if let Some(frame) = frame {
        stack.push(frame);
      }

      // XSLT directives reuse the bracket syntax; leave their attributes
      // alone entirely.
      if !element.name.local.as_ref().starts_with("xsl:") {
        expand_attributes(filter, document, stack, element);
      }

      walk(filter, document, stack, &child);

      if entered {
        let _ = stack.pop();
      }
    } else if child.as_text().is_some() {
      expand_text_node(filter, document, stack, &child);
    }
  }
}

/// A frame for elements that carry their own `owner`/`path` identity,
/// e.g. a list item rendered from a different page than the outer
/// document. A missing half inherits the enclosing frame's value.
fn sub_document_frame(
  node: &NodeRef,
  element: &ElementData,
  stack: &StateStack,
) -> Option<StateFrame> {
  let attributes = element.attributes.borrow();
  let owner = attributes.get("owner").map(ToString::to_string);
  let path = attributes.get("path").map(ToString::to_string);
  if owner.is_none() && path.is_none() {
    return None;
  }

  Some(StateFrame {
    node:  node.clone(),
    owner: owner.unwrap_or_else(|| stack.owner().to_string()),
    page:  path.unwrap_or_else(|| stack.page().to_string()),
  })
}

/// Expand tokens inside attribute values.
///
/// Attribute context disables edit-mode wrapping, and any markup a
/// replacement smuggles in is stripped down to text before assignment.
fn expand_attributes(
  filter: &TextFilter,
  document: &NodeRef,
  stack: &StateStack,
  element: &ElementData,
) {
  let names: Vec<ExpandedName> =
    element.attributes.borrow().map.keys().cloned().collect();

  for name in names {
    let value = element
      .attributes
      .borrow()
      .map
      .get(&name)
      .map(|attr| attr.value.clone());
    let Some(value) = value else {
      continue;
    };
    if !value.contains('[') {
      continue;
    }

    let ctx = ResolveContext {
      page:     stack.page(),
      document: Some(document),
      filter,
    };
    let expanded = expand_in_text(&ctx, &value, false);
    if expanded == value {
      continue;
    }

    let clean = if expanded.contains('<') {
      strip_markup(&expanded)
    } else {
      expanded
    };
    if let Some(attr) = element.attributes.borrow_mut().map.get_mut(&name) {
      attr.value = clean;
    }
  }
}

/// Expand tokens inside one text node. A replacement containing markup is
/// parsed and spliced in place of the node; plain text is written back
/// directly.
fn expand_text_node(
  filter: &TextFilter,
  document: &NodeRef,
  stack: &StateStack,
  node: &NodeRef,
) {
  let Some(text) = node.as_text() else {
    return;
  };
  let original = text.borrow().clone();
  if !original.contains('[') {
    return;
  }

  let ctx = ResolveContext {
    page:     stack.page(),
    document: Some(document),
    filter,
  };
  let expanded =
    expand_in_text(&ctx, &original, filter.options().edit_mode);
  if expanded == original {
    return;
  }

  if expanded.contains('<') {
    for fragment in parse_body_fragment(&expanded) {
      node.insert_before(fragment);
    }
    node.detach();
  } else {
    *text.borrow_mut() = expanded;
  }
}
