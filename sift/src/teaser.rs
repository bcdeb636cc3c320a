//! Bounded-excerpt ("teaser") reduction of a DOM subtree.
//!
//! Walks the subtree in document order counting words and elements,
//! truncates the text node where the word budget runs out, deletes
//! everything past the stopping point, and optionally attaches an end
//! marker. The subtree is reduced in place.

use kuchikikiki::NodeRef;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::html::new_element;

/// Budgets and end-marker configuration for one reduction.
///
/// A `max_words`/`max_tags` value of `0` means "no limit", so a defaulted
/// budget leaves the tree alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeaserBudget {
  /// Maximum number of words kept, `0` for unlimited.
  pub max_words: usize,

  /// Maximum number of elements visited, `0` for unlimited.
  pub max_tags: usize,

  /// Text appended where the excerpt was cut (e.g. an ellipsis).
  pub end_marker: String,

  /// When set together with `end_marker`, the marker becomes a link to
  /// this URI instead of plain text.
  pub end_marker_uri: String,

  /// Optional `title` attribute for the end-marker link.
  pub end_marker_uri_title: String,
}

impl TeaserBudget {
  /// Budget limited to `max_words` words with no other constraints.
  #[must_use]
  pub fn words(max_words: usize) -> Self {
    Self {
      max_words,
      ..Self::default()
    }
  }
}

/// Where the counting walk ran out of budget.
enum Stop {
  /// Budget never ran out.
  None,
  /// The element that reached the tag ceiling; it is deleted together with
  /// everything after it.
  Tag(NodeRef),
  /// The text node where the word ceiling was reached. `truncated` is set
  /// when part of the node's text was cut (rather than the budget landing
  /// exactly on the node's last word).
  Text { node: NodeRef, truncated: bool },
}

/// Reduce the subtree under `body` to the given budget, in place.
///
/// On any reduction the `teaser="reduced"` attribute is set on `body` for
/// downstream consumers to detect truncation. Returns whether any
/// reduction happened.
pub fn reduce(body: &NodeRef, budget: &TeaserBudget) -> bool {
  let mut walk = Walk {
    budget,
    words: 0,
    tags: 0,
  };
  let stop = walk.visit_children(body);

  let (reduced, marker_placed) = match stop {
    Stop::None => return false,
    Stop::Tag(node) => (delete_from(&node, true, body), false),
    Stop::Text { node, truncated } => {
      let deleted = delete_from(&node, false, body);
      let mut placed = false;
      if truncated && !budget.end_marker.is_empty() {
        attach_inline_marker(&node, budget);
        placed = true;
      }
      (deleted || truncated, placed)
    },
  };

  if !reduced {
    return false;
  }

  trace!(
    "teaser reduced at {} words / {} tags",
    walk.words, walk.tags
  );

  if !marker_placed && !budget.end_marker.is_empty() {
    body.append(trailing_end_paragraph(budget));
  }

  if let Some(element) = body.as_element() {
    element
      .attributes
      .borrow_mut()
      .insert("teaser", "reduced".to_string());
  }

  true
}

struct Walk<'a> {
  budget: &'a TeaserBudget,
  words:  usize,
  tags:   usize,
}

impl Walk<'_> {
  /// Document-order counting walk. Children are snapshotted per level so
  /// the later deletion phase never races the traversal.
  fn visit_children(&mut self, parent: &NodeRef) -> Stop {
    let children: Vec<NodeRef> = parent.children().collect();

    for child in children {
      if child.as_element().is_some() {
        self.tags += 1;
        if self.budget.max_tags > 0 && self.tags >= self.budget.max_tags {
          return Stop::Tag(child);
        }
        match self.visit_children(&child) {
          Stop::None => {},
          stop => return stop,
        }
      } else if child.as_text().is_some() {
        match self.scan_text(&child) {
          Stop::None => {},
          stop => return stop,
        }
      }
    }

    Stop::None
  }

  /// Count whitespace-delimited words in a text node, truncating it where
  /// the budget runs out. A word interrupted by an inline tag counts once
  /// per text fragment; existing truncation points depend on this.
  fn scan_text(&mut self, node: &NodeRef) -> Stop {
    if self.budget.max_words == 0 {
      return Stop::None;
    }

    let Some(text) = node.as_text() else {
      return Stop::None;
    };

    let mut cut_at = None;
    {
      let content = text.borrow();
      let mut in_word = false;
      for (idx, c) in content.char_indices() {
        if c.is_whitespace() {
          in_word = false;
        } else if !in_word {
          in_word = true;
          if self.words >= self.budget.max_words {
            cut_at = Some(idx);
            break;
          }
          self.words += 1;
        }
      }
    }

    if let Some(idx) = cut_at {
      let mut content = text.borrow_mut();
      content.truncate(idx);
      return Stop::Text {
        node:      node.clone(),
        truncated: true,
      };
    }

    if self.words >= self.budget.max_words {
      // Budget landed exactly on this node's last word; nothing to cut
      // here, but traversal still switches to the deletion phase.
      return Stop::Text {
        node:      node.clone(),
        truncated: false,
      };
    }

    Stop::None
  }
}

/// Delete every node in document order after the stopping point: following
/// siblings at the stop level, then following siblings of each ancestor,
/// outward to but not including `body`. Returns whether anything was
/// deleted.
fn delete_from(stop: &NodeRef, include_stop: bool, body: &NodeRef) -> bool {
  let mut deleted = false;
  let mut climb = stop.parent();

  for sibling in stop.following_siblings().collect::<Vec<_>>() {
    sibling.detach();
    deleted = true;
  }
  if include_stop {
    stop.detach();
    deleted = true;
  }

  while let Some(ancestor) = climb {
    if &ancestor == body {
      break;
    }
    for sibling in ancestor.following_siblings().collect::<Vec<_>>() {
      sibling.detach();
      deleted = true;
    }
    climb = ancestor.parent();
  }

  deleted
}

/// Attach the configured end marker right where a text node was truncated:
/// plain markers are appended into the node itself, link markers become an
/// anchor sibling immediately after it.
fn attach_inline_marker(node: &NodeRef, budget: &TeaserBudget) {
  if budget.end_marker_uri.is_empty() {
    if let Some(text) = node.as_text() {
      let mut content = text.borrow_mut();
      if !content.ends_with(char::is_whitespace) {
        content.push(' ');
      }
      content.push_str(&budget.end_marker);
    }
    return;
  }

  node.insert_after(end_marker_anchor(budget));
}

fn end_marker_anchor(budget: &TeaserBudget) -> NodeRef {
  let mut attributes = vec![
    ("class", "teaser-end-marker"),
    ("href", budget.end_marker_uri.as_str()),
  ];
  if !budget.end_marker_uri_title.is_empty() {
    attributes.push(("title", budget.end_marker_uri_title.as_str()));
  }

  let anchor = new_element("a", &attributes);
  anchor.append(NodeRef::new_text(budget.end_marker.as_str()));
  anchor
}

/// The trailing `<p class="teaser-end-paragraph">` used when reduction
/// happened without an inline marker.
fn trailing_end_paragraph(budget: &TeaserBudget) -> NodeRef {
  let paragraph = new_element("p", &[("class", "teaser-end-paragraph")]);
  if budget.end_marker_uri.is_empty() {
    paragraph.append(NodeRef::new_text(budget.end_marker.as_str()));
  } else {
    paragraph.append(end_marker_anchor(budget));
  }
  paragraph
}
