#![allow(
  clippy::unwrap_used,
  clippy::expect_used,
  reason = "Fine in tests"
)]

use std::{cell::RefCell, rc::Rc};

use kuchikikiki::NodeRef;
use sift::{
  FilterOptions, FilterOptionsBuilder, Resolution, ResolveContext,
  TextFilter, Token, html,
};
use tendril::TendrilSink as _;

fn parse(html_text: &str) -> NodeRef {
  kuchikikiki::parse_html().one(html_text)
}

fn table_filter(
  table: &'static [(&'static str, &'static str)],
) -> TextFilter {
  TextFilter::new(FilterOptions::default()).with_resolver(
    move |_ctx: &ResolveContext<'_>, token: &Token| {
      table
        .iter()
        .find(|(name, _)| *name == token.name)
        .map_or(Resolution::Unknown, |(_, replacement)| {
          Resolution::Replaced((*replacement).to_string())
        })
    },
  )
}

#[test]
fn test_text_nodes_are_expanded() {
  let filter = table_filter(&[("year", "2024")]);
  let document = parse("<p>happy [year]!</p>");

  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  assert!(out.contains("<p>happy 2024!</p>"), "got: {out}");
}

#[test]
fn test_markup_replacement_is_spliced_not_escaped() {
  let filter = table_filter(&[("badge", "<em>new</em>")]);
  let document = parse("<p>[badge] item</p>");

  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  assert!(out.contains("<em>new</em> item"), "got: {out}");
  assert!(!out.contains("&lt;em&gt;"));
}

#[test]
fn test_replacement_text_is_not_rescanned() {
  let filter = table_filter(&[("a", "[b]"), ("b", "never")]);
  let document = parse("<p>[a]</p>");

  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  assert!(out.contains("<p>[b]</p>"), "got: {out}");
  assert!(!out.contains("never"));
}

#[test]
fn test_attribute_values_are_expanded() {
  let filter = table_filter(&[("id", "42")]);
  let document = parse(r#"<p><a href="/page/[id]" title="[id]">x</a></p>"#);

  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  assert!(out.contains(r#"href="/page/42""#), "got: {out}");
  assert!(out.contains(r#"title="42""#), "got: {out}");
}

#[test]
fn test_attribute_replacement_markup_is_stripped() {
  let filter = table_filter(&[("label", "<b>bold</b> text")]);
  let document = parse(r#"<p><a title="[label]">x</a></p>"#);

  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  assert!(out.contains(r#"title="bold text""#), "got: {out}");
}

#[test]
fn test_xsl_element_attributes_are_skipped() {
  let filter = table_filter(&[("id", "42")]);
  let document =
    parse(r#"<div><xsl:value-of select="[id]"></xsl:value-of>[id]</div>"#);

  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  // The XSLT directive keeps its bracket syntax, the text node does not
  assert!(out.contains(r#"select="[id]""#), "got: {out}");
  assert!(out.contains("42"), "got: {out}");
}

#[test]
fn test_sub_document_frames_switch_page_identity() {
  let pages = Rc::new(RefCell::new(Vec::new()));
  let seen = Rc::clone(&pages);

  let filter = TextFilter::new(FilterOptions::default()).with_resolver(
    move |ctx: &ResolveContext<'_>, token: &Token| {
      if token.name == "whoami" {
        seen.borrow_mut().push(ctx.page.to_string());
        Resolution::Replaced(ctx.page.to_string())
      } else {
        Resolution::Unknown
      }
    },
  );

  let document = parse(concat!(
    "<p>[whoami]</p>",
    r#"<div owner="list" path="page/item">[whoami]</div>"#,
    "<p>[whoami]</p>",
  ));

  assert!(filter.expand_document("page/outer", &document));

  let out = html::to_html(&document).unwrap();
  assert!(out.contains(">page/item</div>"), "got: {out}");
  assert_eq!(
    *pages.borrow(),
    vec!["page/outer", "page/item", "page/outer"]
  );
}

#[test]
fn test_edit_mode_wraps_document_text_tokens() {
  let options = FilterOptionsBuilder::new().edit_mode(true).build();
  let filter = TextFilter::new(options).with_resolver(
    |_ctx: &ResolveContext<'_>, token: &Token| {
      if token.name == "year" {
        Resolution::Replaced("2024".to_string())
      } else {
        Resolution::Unknown
      }
    },
  );

  let document = parse(r#"<p>[year] <a href="/[year]">x</a></p>"#);
  assert!(filter.expand_document("page", &document));

  let out = html::to_html(&document).unwrap();
  assert!(
    out.contains(r#"<span class="filter-token" token="year">2024</span>"#),
    "got: {out}"
  );
  // Attribute values are never edit-wrapped
  assert!(out.contains(r#"href="/2024""#), "got: {out}");
}

#[test]
fn test_recursive_document_expansion_is_refused() {
  let filter = table_filter(&[("year", "2024")]);
  let document = parse("<p>[year]</p>");

  // Nested attempt on the same page is refused...
  let inner = parse("<p>[year]</p>");
  let blocked = TextFilter::new(FilterOptions::default()).with_resolver(
    move |ctx: &ResolveContext<'_>, token: &Token| {
      if token.name == "embed" {
        let expanded = ctx.filter.expand_document(ctx.page, &inner);
        Resolution::Replaced(format!("expanded={expanded}"))
      } else {
        Resolution::Unknown
      }
    },
  );
  let outer = parse("<p>[embed]</p>");
  assert!(blocked.expand_document("page/self", &outer));
  let out = html::to_html(&outer).unwrap();
  assert!(out.contains("expanded=false"), "got: {out}");

  // ...but sequential expansions of the same page are fine
  assert!(filter.expand_document("page", &document));
  assert!(filter.expand_document("page", &document));
}

#[test]
fn test_expand_html_round_trip() {
  let filter = table_filter(&[("site", "Example")]);
  let out = filter
    .expand_html("page", "<p>Welcome to [site]!</p>")
    .unwrap();
  assert!(out.contains("<p>Welcome to Example!</p>"), "got: {out}");
}
