//! Parsed representation of the `[token(args)]` mini-language.
//!
//! A [`Token`] is constructed fresh for each `[...]` occurrence found during
//! a scan pass and discarded as soon as it has been resolved and substituted
//! back into the stream.

/// Lexical class of a single token parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
  /// A quoted string; surrounding quotes are stripped and `\x` unescaped.
  String,
  /// A run of digits; the literal text is retained in `value`.
  Integer,
  /// Digits with a decimal point; the literal text is retained in `value`.
  Real,
  /// A bare identifier (`[A-Za-z][A-Za-z0-9_:]*`).
  Identifier,
}

/// A single parameter of a token, either positional or named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParam {
  /// Parameter name for `name=value` arguments, `None` for positional ones.
  pub name:  Option<String>,
  /// Lexical class of the value.
  pub kind:  ParamKind,
  /// The value text: unquoted/unescaped for strings, literal for the rest.
  pub value: String,
}

/// One parsed unit of the mini-language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  /// Token name (`[A-Za-z][A-Za-z0-9_:]*`; dashes are rejected by the
  /// scanner before a `Token` is ever built).
  pub name:   String,
  /// Parameters in source order.
  pub params: Vec<TokenParam>,
  /// Un-bracketed source text as consumed by the scanner. Nested tokens in
  /// argument position appear here already expanded, since their replacement
  /// is pushed back into the stream before the outer parse consumes it.
  pub source: String,
}

impl Token {
  /// Look up a parameter by name, independent of argument order.
  #[must_use]
  pub fn param(&self, name: &str) -> Option<&TokenParam> {
    self
      .params
      .iter()
      .find(|p| p.name.as_deref() == Some(name))
  }

  /// Look up the `index`-th positional (unnamed) parameter.
  #[must_use]
  pub fn positional(&self, index: usize) -> Option<&TokenParam> {
    self.params.iter().filter(|p| p.name.is_none()).nth(index)
  }

  /// Number of parameters, named and positional.
  #[must_use]
  pub fn arity(&self) -> usize {
    self.params.len()
  }
}

/// Outcome of asking a resolver about one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// The token was recognized; the replacement text is substituted into the
  /// output (or re-injected into the stream for nested tokens).
  Replaced(String),
  /// No resolver recognized the token. The scanner reproduces the original
  /// `[...]` source verbatim; this is never an error.
  Unknown,
}

impl Resolution {
  /// `true` for [`Resolution::Replaced`].
  #[must_use]
  pub const fn is_replaced(&self) -> bool {
    matches!(self, Self::Replaced(_))
  }
}
