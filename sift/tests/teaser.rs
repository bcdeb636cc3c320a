#![allow(
  clippy::unwrap_used,
  clippy::expect_used,
  reason = "Fine in tests"
)]

use kuchikikiki::NodeRef;
use sift::{TeaserBudget, html, teaser};
use tendril::TendrilSink as _;

fn body_of(html_text: &str) -> NodeRef {
  let document = kuchikikiki::parse_html().one(html_text);
  document.select_first("body").unwrap().as_node().clone()
}

#[test]
fn test_word_truncation_without_marker() {
  let body = body_of("<p>one two three four five</p>");
  let budget = TeaserBudget {
    max_words: 3,
    max_tags: 100,
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(out.contains("<p>one two three </p>"), "got: {out}");
  assert!(out.contains(r#"teaser="reduced""#), "got: {out}");
}

#[test]
fn test_word_truncation_with_inline_text_marker() {
  let body = body_of("<p>one two three four five</p>");
  let budget = TeaserBudget {
    max_words: 3,
    end_marker: "...".to_string(),
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(out.contains("<p>one two three ...</p>"), "got: {out}");
  // The inline marker suppresses the trailing paragraph
  assert!(!out.contains("teaser-end-paragraph"));
}

#[test]
fn test_word_truncation_with_anchor_marker() {
  let body = body_of("<p>one two three four five</p>");
  let budget = TeaserBudget {
    max_words: 3,
    end_marker: "...".to_string(),
    end_marker_uri: "/more".to_string(),
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(
    out.contains(r#"<a class="teaser-end-marker" href="/more">...</a>"#),
    "got: {out}"
  );
  // Anchor sits right after the truncated text, inside the paragraph
  assert!(out.contains("one two three "), "got: {out}");
  assert!(!out.contains("teaser-end-paragraph"));
}

#[test]
fn test_anchor_marker_title() {
  let body = body_of("<p>one two three four five</p>");
  let budget = TeaserBudget {
    max_words: 2,
    end_marker: "more".to_string(),
    end_marker_uri: "/full".to_string(),
    end_marker_uri_title: "Read the whole story".to_string(),
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(
    out.contains(r#"title="Read the whole story""#),
    "got: {out}"
  );
}

#[test]
fn test_tag_budget_deletes_ceiling_element_and_rest() {
  let body = body_of("<p>a</p><p>b</p><p>c</p>");
  let budget = TeaserBudget {
    max_tags: 2,
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(out.contains("<p>a</p>"), "got: {out}");
  assert!(!out.contains("<p>b</p>"));
  assert!(!out.contains("<p>c</p>"));
  assert!(out.contains(r#"teaser="reduced""#));
}

#[test]
fn test_tag_budget_with_marker_appends_trailing_paragraph() {
  let body = body_of("<p>a</p><p>b</p><p>c</p>");
  let budget = TeaserBudget {
    max_tags: 2,
    end_marker: "continued".to_string(),
    end_marker_uri: "/story".to_string(),
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(
    out.contains(r#"<p class="teaser-end-paragraph">"#),
    "got: {out}"
  );
  assert!(out.contains(r#"href="/story""#), "got: {out}");
  assert!(out.contains("continued"));
}

#[test]
fn test_word_budget_on_node_boundary_deletes_following_content() {
  let body = body_of("<p>one two</p><p>three four</p>");
  let budget = TeaserBudget {
    max_words: 2,
    end_marker: "...".to_string(),
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  // First paragraph was exactly on budget, nothing to truncate there
  assert!(out.contains("<p>one two</p>"), "got: {out}");
  assert!(!out.contains("three"));
  // No inline marker was placed, so the trailing paragraph carries it
  assert!(out.contains(r#"<p class="teaser-end-paragraph">...</p>"#));
}

#[test]
fn test_within_budget_is_untouched() {
  let body = body_of("<p>one two three</p>");
  let budget = TeaserBudget {
    max_words: 50,
    max_tags: 50,
    end_marker: "...".to_string(),
    ..TeaserBudget::default()
  };

  assert!(!teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(out.contains("<p>one two three</p>"), "got: {out}");
  assert!(!out.contains("teaser"));
}

#[test]
fn test_zero_budget_means_no_limit() {
  let body = body_of("<p>one two three</p><p>four</p>");
  assert!(!teaser::reduce(&body, &TeaserBudget::default()));
}

#[test]
fn test_words_counted_per_fragment_across_inline_tags() {
  // "inter" + "rupted" is two words as far as the counter is concerned;
  // the budget of 3 is reached by {one, inter, rupted} and "two" is cut.
  let body = body_of("<p>one inter<b></b>rupted two</p>");
  let budget = TeaserBudget {
    max_words: 3,
    max_tags: 100,
    ..TeaserBudget::default()
  };

  assert!(teaser::reduce(&body, &budget));

  let out = html::to_html(&body).unwrap();
  assert!(!out.contains("two"), "got: {out}");
}
