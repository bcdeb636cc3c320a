#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use kuchikikiki::NodeRef;
use sift::{
  FilterOptions, Resolution, ResolveContext, SanitizePolicy, TeaserBudget,
  TextFilter, Token, sanitize, teaser,
};
use tendril::TendrilSink as _;

const TEXT_SMALL: &str =
  "Welcome to [site_name], it is [year] and all is well.";

const TEXT_LARGE: &str = r#"
[site_name] newsletter, [year] edition.

Read the [link("/features", "feature list")] before upgrading. Unresolved
[tokens] and malformed [candidates( are reproduced verbatim, and nested
arguments such as [link([*path], 1)] resolve inside out. Plain prose in
between is copied through the scanner one character at a time, which is
what this benchmark is mostly about: [year] [year] [year].
"#;

const HTML_BODY: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <h1>Getting Started</h1>
    <p onclick="evil()">If you can read this, chances are you can also use
    this tool properly. It has <b>bold</b> claims, <i>italic</i> asides and
    the occasional <script>alert("surprise")</script> to throw away.</p>
    <ul>
      <li>Computer</li>
      <li>Basic knowledge of command line</li>
      <li>Text editor</li>
    </ul>
    <p>After installation, you can verify it works. Create a configuration
    file and keep notes about every <span style="color:red">setting</span>
    you change along the way.</p>
  </body>
</html>"#;

fn bench_filter() -> TextFilter {
  TextFilter::new(FilterOptions::default()).with_resolver(
    |_ctx: &ResolveContext<'_>, token: &Token| match token.name.as_str() {
      "site_name" => Resolution::Replaced("Example".to_string()),
      "year" => Resolution::Replaced("2024".to_string()),
      "path" => Resolution::Replaced("/features".to_string()),
      "link" => Resolution::Replaced("<a href=\"/f\">f</a>".to_string()),
      _ => Resolution::Unknown,
    },
  )
}

fn parse_body(html: &str) -> NodeRef {
  let document = kuchikikiki::parse_html().one(html);
  document.select_first("body").unwrap().as_node().clone()
}

fn bench_expand_text(c: &mut Criterion) {
  let mut group = c.benchmark_group("expand_text");
  let filter = bench_filter();

  group.bench_function("small", |b| {
    b.iter(|| filter.expand_text(black_box("page"), black_box(TEXT_SMALL)));
  });
  group.bench_function("large", |b| {
    b.iter(|| filter.expand_text(black_box("page"), black_box(TEXT_LARGE)));
  });

  group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
  let policy = SanitizePolicy::basic_text();

  c.bench_function("sanitize", |b| {
    b.iter_batched(
      || parse_body(HTML_BODY),
      |body| sanitize(black_box(&body), black_box(&policy)),
      BatchSize::SmallInput,
    );
  });
}

fn bench_teaser(c: &mut Criterion) {
  let budget = TeaserBudget {
    max_words: 20,
    max_tags: 6,
    end_marker: "...".to_string(),
    ..TeaserBudget::default()
  };

  c.bench_function("teaser", |b| {
    b.iter_batched(
      || parse_body(HTML_BODY),
      |body| teaser::reduce(black_box(&body), black_box(&budget)),
      BatchSize::SmallInput,
    );
  });
}

criterion_group!(benches, bench_expand_text, bench_sanitize, bench_teaser);
criterion_main!(benches);
