//! Per-request expansion state: the recursion guard and the owner stack.
//!
//! Both pieces are scoped to one logical render. The recursion guard lives
//! on the [`TextFilter`](crate::filter::TextFilter) instance (one per
//! request); the state stack lives on the stack of a single document pass.

use std::{cell::RefCell, collections::HashSet};

use kuchikikiki::NodeRef;
use log::error;

/// Set of page identities currently being expanded.
///
/// Used to detect and short-circuit self-referential token loops: a page
/// whose tokens end up rendering the page itself. Insertion happens on
/// [`ExpansionTracker::enter`], removal when the returned guard drops, so
/// early returns cannot leak an entry.
#[derive(Debug, Default)]
pub struct ExpansionTracker {
  expanding: RefCell<HashSet<String>>,
}

impl ExpansionTracker {
  /// Create an empty tracker.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark `page` as being expanded for the lifetime of the returned guard.
  ///
  /// Returns `None` when `page` is already in flight; the caller logs and
  /// skips the expansion rather than failing the render.
  #[must_use]
  pub fn enter(&self, page: &str) -> Option<ExpansionGuard<'_>> {
    if !self.expanding.borrow_mut().insert(page.to_string()) {
      error!("recursive token expansion detected for page \"{page}\", skipping");
      return None;
    }
    Some(ExpansionGuard {
      tracker: self,
      page:    page.to_string(),
    })
  }

  /// `true` while `page` is being expanded.
  #[must_use]
  pub fn is_expanding(&self, page: &str) -> bool {
    self.expanding.borrow().contains(page)
  }
}

/// RAII handle removing its page from the tracker on drop.
pub struct ExpansionGuard<'a> {
  tracker: &'a ExpansionTracker,
  page:    String,
}

impl Drop for ExpansionGuard<'_> {
  fn drop(&mut self) {
    self.tracker.expanding.borrow_mut().remove(&self.page);
  }
}

/// One frame of the owner stack.
///
/// A frame is pushed when the document walk enters a sub-document element
/// carrying `owner`/`path` attributes, e.g. a list item rendered from a
/// different page than the outer document.
#[derive(Debug, Clone)]
pub struct StateFrame {
  /// The element that introduced this frame.
  pub node:  NodeRef,
  /// Name of the component that supplied the subtree.
  pub owner: String,
  /// Page identity token resolution should run under within this subtree.
  pub page:  String,
}

/// Stack of [`StateFrame`]s tracking which page identity applies to the
/// subtree currently being walked.
///
/// A pop or accessor call on an empty stack indicates mismatched push/pop
/// bookkeeping in the walker and is treated as a hard programming error.
#[derive(Debug, Default)]
pub struct StateStack {
  frames: Vec<StateFrame>,
}

impl StateStack {
  /// Create a stack holding the root frame for the outermost document.
  #[must_use]
  pub fn new(node: NodeRef, owner: &str, page: &str) -> Self {
    Self {
      frames: vec![StateFrame {
        node,
        owner: owner.to_string(),
        page: page.to_string(),
      }],
    }
  }

  /// Push a frame for a sub-document element.
  pub fn push(&mut self, frame: StateFrame) {
    self.frames.push(frame);
  }

  /// Pop the innermost frame.
  ///
  /// # Panics
  ///
  /// Panics when the stack is empty; this means a pop without a matching
  /// push and must not be silently tolerated.
  #[allow(
    clippy::panic,
    reason = "Empty stack is a caller logic error, not a recoverable state"
  )]
  pub fn pop(&mut self) -> StateFrame {
    self
      .frames
      .pop()
      .unwrap_or_else(|| panic!("state stack pop with no matching push"))
  }

  /// Owner recorded on the innermost frame.
  ///
  /// # Panics
  ///
  /// Panics when the stack is empty.
  #[allow(
    clippy::panic,
    reason = "Empty stack is a caller logic error, not a recoverable state"
  )]
  #[must_use]
  pub fn owner(&self) -> &str {
    self
      .frames
      .last()
      .map_or_else(|| panic!("owner queried on empty state stack"), |f| {
        f.owner.as_str()
      })
  }

  /// Page identity recorded on the innermost frame.
  ///
  /// # Panics
  ///
  /// Panics when the stack is empty.
  #[allow(
    clippy::panic,
    reason = "Empty stack is a caller logic error, not a recoverable state"
  )]
  #[must_use]
  pub fn page(&self) -> &str {
    self
      .frames
      .last()
      .map_or_else(|| panic!("page queried on empty state stack"), |f| {
        f.page.as_str()
      })
  }

  /// Current stack depth, root frame included.
  #[must_use]
  pub fn depth(&self) -> usize {
    self.frames.len()
  }
}
