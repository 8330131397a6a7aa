mod common;

use common::{HEADER, java_header};
use licenser::rewrite::{FormatOutcome, Language};
use licenser::rule::{LicenseRule, RuleSetBuilder};
use licenser::year::{YearDisplayMode, YearSelectionMode, render_year_field};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn changed(outcome: FormatOutcome) -> String {
  match outcome {
    FormatOutcome::Changed(content) => content,
    other => panic!("expected a change, got {other:?}"),
  }
}

#[test]
fn test_insert_header_into_java_file() {
  let rule = LicenseRule::new("Copyright ${YEAR} Example\n").expect("rule compiles");
  let source = "package com.example;\n\nclass A {}\n";

  let updated = changed(rule.format(source, Language::Java, 2024));
  assert_eq!(
    updated,
    "/*\n * Copyright 2024 Example\n */\n\npackage com.example;\n\nclass A {}\n"
  );
  assert!(rule.validate(&updated));
  assert_eq!(rule.format(&updated, Language::Java, 2024), FormatOutcome::Unchanged);
}

#[test]
fn test_known_year_is_kept() {
  let existing = Some("2020, 2022");
  assert_eq!(render_year_field(existing, 2022, YearDisplayMode::List), "2020, 2022");
  assert_eq!(render_year_field(existing, 2022, YearDisplayMode::LatestOnly), "2022");
}

#[test]
fn test_malformed_year_token_is_discarded() {
  assert_eq!(
    render_year_field(Some("abcd-2020, 2019"), 2021, YearDisplayMode::List),
    "2019, 2021"
  );
}

#[test]
fn test_existing_years_are_extended() {
  let rule = LicenseRule::new(&format!("{HEADER};;year_display: list\n")).expect("rule compiles");
  let source = format!("{}package a;\n", java_header("2019-2020"));

  let updated = changed(rule.format(&source, Language::Java, 2023));
  assert_eq!(updated, format!("{}package a;\n", java_header("2019, 2020, 2023")));
}

#[test]
fn test_lenient_range_spans_recorded_order() {
  let rule = LicenseRule::new(&format!("{HEADER};;year_display: lenient_range\n")).expect("rule compiles");
  let source = format!("{}package a;\n", java_header("2018"));

  let updated = changed(rule.format(&source, Language::Java, 2024));
  assert_eq!(updated, format!("{}package a;\n", java_header("2018-2024")));
}

#[test]
fn test_kotlin_file_annotation_comes_first() {
  let rule = LicenseRule::new(HEADER).expect("rule compiles");
  let source = "@file:JvmName(\"Util\")\n\npackage a\n";

  let updated = changed(rule.format(source, Language::Kotlin, 2024));
  assert_eq!(updated, format!("{}{source}", java_header("2024")));
}

#[test]
fn test_first_registered_rule_is_chosen() {
  let mut builder = RuleSetBuilder::new();
  builder
    .rule(LicenseRule::new("First ${YEAR}\n").expect("rule compiles"))
    .rule(LicenseRule::new("Second ${YEAR}\n").expect("rule compiles"));
  let rules = builder.build();

  let mut rng = ChaCha8Rng::seed_from_u64(7);
  for _ in 0..50 {
    let name: String = (0..rng.random_range(1..12))
      .map(|_| char::from(rng.random_range(b'a'..=b'z')))
      .collect();
    let content = format!("package {name};\n");

    let selected = rules.select(&content).expect("a rule applies");
    assert_eq!(selected.template().body(), "First ${YEAR}");

    let updated = changed(rules.format(&content, Language::Java, |rule| {
      assert_eq!(rule.template().body(), "First ${YEAR}");
      2024
    }));
    assert!(updated.starts_with("/*\n * First 2024\n */\n\n"));
  }
}

#[test]
fn test_selector_routes_packages() {
  let mut builder = RuleSetBuilder::new();
  builder
    .rule(LicenseRule::new("Internal ${YEAR}\n;;match_from: package com\\.internal\n").expect("rule compiles"))
    .rule(LicenseRule::new("Public ${YEAR}\n").expect("rule compiles"));
  let rules = builder.build();

  let internal = changed(rules.format("package com.internal.x;\n", Language::Java, |_| 2024));
  assert!(internal.contains(" * Internal 2024\n"));

  let public = changed(rules.format("package com.other;\n", Language::Java, |_| 2024));
  assert!(public.contains(" * Public 2024\n"));

  // A file carrying the first rule's header keeps it even outside the selector.
  let moved = internal.replace("com.internal.x", "com.moved");
  assert_eq!(rules.select(&moved).map(|r| r.template().body()), Some("Internal ${YEAR}".to_string()));
  assert!(rules.validate(&moved));
}

fn random_line(rng: &mut ChaCha8Rng) -> String {
  const ALPHABET: &[u8] = b"ABCxyz019 .,()[]{}+?^$|\\-*#&:'\"";
  (0..rng.random_range(0..30))
    .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
    .collect()
}

fn random_template(rng: &mut ChaCha8Rng) -> String {
  let line_count = rng.random_range(1..6);
  let year_line = rng.random_range(0..line_count);
  let mut lines = Vec::with_capacity(line_count);
  for i in 0..line_count {
    let mut line = random_line(rng);
    if i == year_line && rng.random_bool(0.8) {
      // Text right after the year starts with a letter so the year field
      // cannot absorb it.
      line.push_str(" ${YEAR} Corp");
      line.push_str(&random_line(rng));
    }
    lines.push(line);
  }
  // The last body line must not be blank, or it would join the metadata region.
  lines.push("End.".to_string());
  lines.join("\n") + "\n"
}

#[test]
fn test_formatted_header_validates_and_is_stable() {
  let mut rng = ChaCha8Rng::seed_from_u64(42);
  let displays = [YearDisplayMode::LenientRange, YearDisplayMode::List, YearDisplayMode::LatestOnly];

  for _ in 0..200 {
    let template = random_template(&mut rng);
    let display = displays[rng.random_range(0..displays.len())];
    let rule =
      LicenseRule::with_defaults(&template, display, YearSelectionMode::Project).expect("template compiles");
    let year = rng.random_range(1990..2100);

    let updated = changed(rule.format("package a.b;\n\nclass C {}\n", Language::Java, year));
    assert!(rule.validate(&updated), "header of {template:?} does not validate:\n{updated}");
    assert_eq!(
      rule.format(&updated, Language::Java, year),
      FormatOutcome::Unchanged,
      "formatting {template:?} twice changed the file"
    );
  }
}
