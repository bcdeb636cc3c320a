//! Stateless URI and filename sanitizers.
//!
//! Both functions rewrite their input in place. Their edge-case policies
//! are deliberate and easy to get subtly wrong; see the tests.

/// Sanitize a URI segment in a single left-to-right pass.
///
/// Spaces become dashes, anything outside `[0-9a-zA-Z_-]` is dropped, a
/// dash immediately following another dash is dropped, and a leading dash
/// or underscore is dropped.
///
/// Returns `true` iff no character needed to be altered or removed.
pub fn filter_uri(uri: &mut String) -> bool {
  let mut out = String::with_capacity(uri.len());
  let mut changed = false;

  for c in uri.chars() {
    let c = if c == ' ' {
      changed = true;
      '-'
    } else {
      c
    };

    if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
      changed = true;
      continue;
    }
    if c == '-' && out.ends_with('-') {
      changed = true;
      continue;
    }
    if out.is_empty() && (c == '-' || c == '_') {
      changed = true;
      continue;
    }
    out.push(c);
  }

  if changed {
    *uri = out;
  }
  !changed
}

/// Sanitize a filename and force its extension.
///
/// Strips any path prefix, lowercases, maps spaces to dashes, collapses
/// repeated dashes, trims dashes at both ends, then replaces (or appends)
/// the extension when `extension` is non-empty.
///
/// Returns `false` and clears the name when the result would be empty or a
/// hidden file (leading `.`).
pub fn filter_filename(filename: &mut String, extension: &str) -> bool {
  let basename = filename
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or_default()
    .to_lowercase();

  let mut name = String::with_capacity(basename.len());
  for c in basename.chars() {
    let c = if c == ' ' { '-' } else { c };
    if c == '-' && name.ends_with('-') {
      continue;
    }
    name.push(c);
  }
  let mut name = name.trim_matches('-').to_string();

  if !extension.is_empty() {
    if let Some(dot) = name.rfind('.') {
      name.truncate(dot);
    }
    name.push('.');
    name.push_str(extension);
  }

  if name.is_empty() || name.starts_with('.') {
    filename.clear();
    return false;
  }

  *filename = name;
  true
}
