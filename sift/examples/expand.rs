#![allow(
  clippy::unwrap_used,
  clippy::expect_used,
  clippy::print_stdout,
  reason = "Fine in examples"
)]

use kuchikikiki::NodeRef;
use sift::{
  FilterOptionsBuilder, Resolution, ResolveContext, SanitizePolicy,
  TeaserBudget, TextFilter, Token, html, sanitize, teaser,
};
use tendril::TendrilSink as _;

fn main() {
  env_logger::init();

  println!("sift examples\n");

  example_token_expansion();
  example_edit_mode();
  example_sanitizer();
  example_teaser();
}

fn demo_filter(edit_mode: bool) -> TextFilter {
  let options = FilterOptionsBuilder::new().edit_mode(edit_mode).build();
  TextFilter::new(options).with_resolver(
    |_ctx: &ResolveContext<'_>, token: &Token| match token.name.as_str() {
      "site_name" => Resolution::Replaced("Example Site".to_string()),
      "year" => Resolution::Replaced("2024".to_string()),
      "link" => {
        let target = token
          .positional(0)
          .map_or("/", |p| p.value.as_str());
        Resolution::Replaced(format!(r#"<a href="{target}">here</a>"#))
      },
      _ => Resolution::Unknown,
    },
  )
}

/// Plain text token expansion with unknown tokens passing through
fn example_token_expansion() {
  println!("=== Token Expansion ===");

  let filter = demo_filter(false);
  let text = r#"(c) [year] [site_name]. Click [link("/about")]. [unknown] stays."#;
  println!("in:  {text}");
  println!("out: {}\n", filter.expand_text("page/front", text));
}

/// Edit mode wraps replacements so an editor can find them again
fn example_edit_mode() {
  println!("=== Edit Mode ===");

  let filter = demo_filter(true);
  println!("out: {}\n", filter.expand_text("page/front", "[year]"));
}

/// Sanitizing untrusted HTML with the basic formatting allowlist
fn example_sanitizer() {
  println!("=== Sanitizer ===");

  let input = r#"<p onclick="evil()">hello <b>world</b><script>evil()</script></p>"#;
  let document = kuchikikiki::parse_html().one(input);
  let body = body_of(&document);

  sanitize(&body, &SanitizePolicy::basic_text());
  println!("in:  {input}");
  println!("out: {}\n", html::to_html(&body).unwrap());
}

/// Reducing a body to a teaser excerpt with a read-more link
fn example_teaser() {
  println!("=== Teaser ===");

  let input = "<p>The quick brown fox jumps over the lazy dog.</p>";
  let document = kuchikikiki::parse_html().one(input);
  let body = body_of(&document);

  let budget = TeaserBudget {
    max_words: 4,
    end_marker: "read more".to_string(),
    end_marker_uri: "/fox".to_string(),
    ..TeaserBudget::default()
  };
  let reduced = teaser::reduce(&body, &budget);
  println!("in:      {input}");
  println!("out:     {}", html::to_html(&body).unwrap());
  println!("reduced: {reduced}");
}

fn body_of(document: &NodeRef) -> NodeRef {
  document.select_first("body").unwrap().as_node().clone()
}
