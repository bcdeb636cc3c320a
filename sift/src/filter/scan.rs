//! Character-level scanner for the `[token(args)]` mini-language.
//!
//! The scanner walks a text buffer one character at a time with an
//! unbounded pushback buffer: a resolved nested token's replacement is
//! pushed back into the stream so the enclosing parse consumes it as if it
//! had been there originally. Parsing a candidate token is all-or-nothing;
//! when any expected separator or terminator is missing, the consumed
//! transcript is emitted verbatim and scanning resumes after it.

use log::warn;

use crate::{
  html::{encode_entities, first_tag_name},
  resolver::ResolveContext,
  token::{ParamKind, Resolution, Token, TokenParam},
};

/// Cursor over the input with a pushback stack.
///
/// `unget_str` supports pushing back an entire string; this is what makes
/// nested-token re-injection possible.
struct Cursor {
  input:    Vec<char>,
  pos:      usize,
  pushback: Vec<char>,
}

impl Cursor {
  fn new(text: &str) -> Self {
    Self {
      input:    text.chars().collect(),
      pos:      0,
      pushback: Vec::new(),
    }
  }

  fn next(&mut self) -> Option<char> {
    if let Some(c) = self.pushback.pop() {
      return Some(c);
    }
    let c = self.input.get(self.pos).copied();
    if c.is_some() {
      self.pos += 1;
    }
    c
  }

  fn unget(&mut self, c: char) {
    self.pushback.push(c);
  }

  fn unget_str(&mut self, text: &str) {
    for c in text.chars().rev() {
      self.pushback.push(c);
    }
  }
}

/// One expansion pass over a text buffer.
pub(crate) struct TextScan<'a> {
  cursor:    Cursor,
  ctx:       &'a ResolveContext<'a>,
  edit_mode: bool,
  depth:     usize,
}

/// Expand every recognized token in `text`, reproducing everything else
/// verbatim.
pub(crate) fn expand_in_text(
  ctx: &ResolveContext<'_>,
  text: &str,
  edit_mode: bool,
) -> String {
  // Nothing to scan without an opening bracket
  if !text.contains('[') {
    return text.to_string();
  }

  TextScan {
    cursor: Cursor::new(text),
    ctx,
    edit_mode,
    depth: 0,
  }
  .run()
}

impl TextScan<'_> {
  fn run(mut self) -> String {
    let mut out = String::with_capacity(self.cursor.input.len());

    while let Some(c) = self.cursor.next() {
      if c == '[' {
        match self.read_token() {
          Ok(token) => self.substitute(&token, &mut out),
          Err(raw) => out.push_str(&raw),
        }
      } else {
        out.push(c);
      }
    }

    out
  }

  /// Consume one character, recording it in the transcript.
  fn getc(&mut self, raw: &mut String) -> Option<char> {
    let c = self.cursor.next();
    if let Some(c) = c {
      raw.push(c);
    }
    c
  }

  /// Push one character back, removing it from the transcript again.
  fn ungetc(&mut self, raw: &mut String, c: char) {
    self.cursor.unget(c);
    raw.pop();
  }

  fn skip_whitespace(&mut self, raw: &mut String) {
    while let Some(c) = self.getc(raw) {
      if !c.is_whitespace() {
        self.ungetc(raw, c);
        break;
      }
    }
  }

  /// Parse a candidate token; the cursor sits just past the opening `[`.
  ///
  /// On failure returns the transcript of everything consumed, bracket
  /// included, for verbatim re-emission.
  fn read_token(&mut self) -> Result<Token, String> {
    let mut raw = String::from("[");
    match self.read_token_inner(&mut raw) {
      Ok(token) => Ok(token),
      Err(()) => Err(raw),
    }
  }

  fn read_token_inner(&mut self, raw: &mut String) -> Result<Token, ()> {
    let start = raw.len();
    let name = self.read_name(raw)?;
    self.skip_whitespace(raw);

    let mut params = Vec::new();
    match self.getc(raw) {
      Some('(') => {
        self.read_arguments(raw, &mut params)?;
        self.skip_whitespace(raw);
        if self.getc(raw) != Some(']') {
          return Err(());
        }
      },
      Some(']') => {},
      _ => return Err(()),
    }

    let source = raw[start..raw.len() - 1].to_string();
    Ok(Token {
      name,
      params,
      source,
    })
  }

  fn read_name(&mut self, raw: &mut String) -> Result<String, ()> {
    let mut name = String::new();
    loop {
      match self.getc(raw) {
        Some(c) if name.is_empty() => {
          if c.is_ascii_alphabetic() {
            name.push(c);
          } else {
            return Err(());
          }
        },
        Some(c)
          if c.is_ascii_alphanumeric() || c == '_' || c == ':' =>
        {
          name.push(c);
        },
        Some('-') => {
          // Token names use underscores; a dash is rejected, not split
          warn!(
            "dash in token name near \"[{name}-\"; use underscores instead"
          );
          return Err(());
        },
        Some(c) => {
          self.ungetc(raw, c);
          return Ok(name);
        },
        None => return Err(()),
      }
    }
  }

  fn read_arguments(
    &mut self,
    raw: &mut String,
    params: &mut Vec<TokenParam>,
  ) -> Result<(), ()> {
    self.skip_whitespace(raw);
    match self.getc(raw) {
      Some(')') => return Ok(()),
      Some(c) => self.ungetc(raw, c),
      None => return Err(()),
    }

    loop {
      let param = self.read_argument(raw)?;
      params.push(param);
      self.skip_whitespace(raw);
      match self.getc(raw) {
        Some(',') => self.skip_whitespace(raw),
        Some(')') => return Ok(()),
        _ => return Err(()),
      }
    }
  }

  /// One argument: a value, or `name=value` when the value parses as an
  /// identifier followed by `=`.
  fn read_argument(&mut self, raw: &mut String) -> Result<TokenParam, ()> {
    let first = self.read_value(raw)?;
    if first.kind == ParamKind::Identifier {
      self.skip_whitespace(raw);
      match self.getc(raw) {
        Some('=') => {
          self.skip_whitespace(raw);
          let value = self.read_value(raw)?;
          return Ok(TokenParam {
            name:  Some(first.value),
            kind:  value.kind,
            value: value.value,
          });
        },
        Some(c) => self.ungetc(raw, c),
        None => {},
      }
    }
    Ok(first)
  }

  fn read_value(&mut self, raw: &mut String) -> Result<TokenParam, ()> {
    match self.getc(raw) {
      Some(q @ ('"' | '\'')) => self.read_string(raw, q),
      Some(c) if c.is_ascii_digit() || c == '.' => self.read_number(raw, c),
      Some('[') => {
        self.read_nested(raw)?;
        self.read_value(raw)
      },
      Some(c) if c.is_ascii_alphabetic() => self.read_identifier(raw, c),
      _ => Err(()),
    }
  }

  /// Quoted string; a backslash escapes any following character,
  /// including the quote.
  fn read_string(
    &mut self,
    raw: &mut String,
    quote: char,
  ) -> Result<TokenParam, ()> {
    let mut value = String::new();
    loop {
      match self.getc(raw) {
        Some('\\') => match self.getc(raw) {
          Some(c) => value.push(c),
          None => return Err(()),
        },
        Some(c) if c == quote => break,
        Some(c) => value.push(c),
        None => return Err(()),
      }
    }
    Ok(TokenParam {
      name: None,
      kind: ParamKind::String,
      value,
    })
  }

  fn read_number(
    &mut self,
    raw: &mut String,
    first: char,
  ) -> Result<TokenParam, ()> {
    let mut value = String::new();
    value.push(first);
    let mut real = first == '.';

    loop {
      match self.getc(raw) {
        Some(c) if c.is_ascii_digit() => value.push(c),
        Some('.') if !real => {
          real = true;
          value.push('.');
        },
        Some(c) => {
          self.ungetc(raw, c);
          break;
        },
        None => break,
      }
    }

    Ok(TokenParam {
      name: None,
      kind: if real {
        ParamKind::Real
      } else {
        ParamKind::Integer
      },
      value,
    })
  }

  fn read_identifier(
    &mut self,
    raw: &mut String,
    first: char,
  ) -> Result<TokenParam, ()> {
    let mut value = String::new();
    value.push(first);

    loop {
      match self.getc(raw) {
        Some(c)
          if c.is_ascii_alphanumeric() || c == '_' || c == ':' =>
        {
          value.push(c);
        },
        Some(c) => {
          self.ungetc(raw, c);
          break;
        },
        None => break,
      }
    }

    Ok(TokenParam {
      name: None,
      kind: ParamKind::Identifier,
      value,
    })
  }

  /// Nested token in value position; the cursor sits just past its `[`.
  ///
  /// The resolved replacement is pushed back into the stream for the outer
  /// parse to consume; a leading `*` wraps the replacement in double quotes
  /// first so it reads back as a single string argument. On success the
  /// nested source is dropped from the transcript, which from here on
  /// records the replacement as it is consumed.
  fn read_nested(&mut self, raw: &mut String) -> Result<(), ()> {
    let mark = raw.len() - 1;

    let quoted = match self.getc(raw) {
      Some('*') => true,
      Some(c) => {
        self.ungetc(raw, c);
        false
      },
      None => return Err(()),
    };

    if self.depth >= self.ctx.filter.options().max_nested_depth {
      warn!("nested token depth limit reached, treating as literal text");
      return Err(());
    }

    self.depth += 1;
    let parsed = self.read_token_inner(raw);
    self.depth -= 1;
    let token = parsed?;

    match self.ctx.filter.resolve(self.ctx, &token) {
      Resolution::Replaced(replacement) => {
        raw.truncate(mark);
        if quoted {
          self.cursor.unget_str(&quote_string(&replacement));
        } else {
          self.cursor.unget_str(&replacement);
        }
        Ok(())
      },
      Resolution::Unknown => Err(()),
    }
  }

  /// Emit the resolution of a successfully parsed top-level token.
  /// Replacements are final; they are not re-scanned.
  fn substitute(&mut self, token: &Token, out: &mut String) {
    match self.ctx.filter.resolve(self.ctx, token) {
      Resolution::Replaced(replacement) => {
        if self.edit_mode {
          out.push_str(&wrap_edit_token(
            &replacement,
            &token.source,
            self.ctx.filter.inline_classifier(),
          ));
        } else {
          out.push_str(&replacement);
        }
      },
      Resolution::Unknown => {
        out.push('[');
        out.push_str(&token.source);
        out.push(']');
      },
    }
  }
}

/// Wrap `text` in double quotes, escaping embedded quotes and backslashes,
/// so it reads back as a single string value.
fn quote_string(text: &str) -> String {
  let mut quoted = String::with_capacity(text.len() + 2);
  quoted.push('"');
  for c in text.chars() {
    if c == '"' || c == '\\' {
      quoted.push('\\');
    }
    quoted.push(c);
  }
  quoted.push('"');
  quoted
}

/// Edit-mode wrapper marking replaced text in the rendered page so an
/// editor can map it back to its token. The element is a span unless the
/// replacement opens with a block-level tag.
fn wrap_edit_token(
  replacement: &str,
  source: &str,
  is_inline: fn(&str) -> bool,
) -> String {
  let inline = first_tag_name(replacement).is_none_or(|tag| is_inline(&tag));
  let element = if inline { "span" } else { "div" };
  format!(
    "<{element} class=\"filter-token\" token=\"{}\">{replacement}</{element}>",
    encode_entities(source)
  )
}
