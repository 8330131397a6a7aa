//! # Rule Module
//!
//! A [`LicenseRule`] is a compiled header template: it knows whether it applies
//! to a file, whether the file's header is valid and how to rewrite it.
//!
//! Rules are registered on a [`RuleSetBuilder`] while configuration is read
//! and frozen into a [`RuleSet`] before any file is touched. Within a set the
//! first rule that matches a file wins, for checking and for rewriting alike.
//!
//! ## Example
//!
//! ```rust
//! use licenser::rewrite::{FormatOutcome, Language};
//! use licenser::rule::{LicenseRule, RuleSetBuilder};
//!
//! # fn main() -> Result<(), licenser::rule::RuleError> {
//! let mut builder = RuleSetBuilder::new();
//! builder.rule(LicenseRule::new("Copyright ${YEAR} Example\n")?);
//! let rules = builder.build();
//!
//! let source = "package com.example;\n";
//! assert!(!rules.validate(source));
//!
//! let rule = rules.select(source).expect("rule without selector matches");
//! let FormatOutcome::Changed(updated) = rule.format(source, Language::Java, 2024) else {
//!   unreachable!()
//! };
//! assert_eq!(updated, "/*\n * Copyright 2024 Example\n */\n\npackage com.example;\n");
//! assert!(rules.validate(&updated));
//! # Ok(())
//! # }
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use crate::comment::{BLOCK_COMMENT, LicenseComment};
use crate::pattern::{compile_selector, compile_validator};
use crate::rewrite::{self, FormatOutcome, Language};
use crate::template::{HeaderTemplate, TemplateSource, YEAR_KEY};
use crate::year::{YearDisplayMode, YearSelectionMode, render_year_field};

const YEAR_DISPLAY_KEY: &str = "year_display";
const YEAR_SELECTION_KEY: &str = "year_selection";

/// Errors raised while building license rules.
#[derive(Debug, Error)]
pub enum RuleError {
  #[error("Failed to read license header template {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Invalid match_from pattern in license header template: {source}")]
  Selector {
    #[source]
    source: regex::Error,
  },

  #[error("License header template does not compile to a valid pattern: {source}")]
  Validator {
    #[source]
    source: regex::Error,
  },
}

/// A compiled license header template.
#[derive(Debug, Clone)]
pub struct LicenseRule {
  template: HeaderTemplate,
  validator: Regex,
  selector: Option<Regex>,
  year_display: YearDisplayMode,
  year_selection: YearSelectionMode,
}

impl LicenseRule {
  /// Compiles a template document with the default year modes.
  pub fn new(document: &str) -> Result<Self, RuleError> {
    Self::with_defaults(document, YearDisplayMode::default(), YearSelectionMode::default())
  }

  /// Compiles a template document.
  ///
  /// `year_display` and `year_selection` apply unless the template's metadata
  /// names a mode of its own.
  ///
  /// # Errors
  ///
  /// Returns an error if a `match_from` line is not a valid regular expression.
  pub fn with_defaults(
    document: &str,
    year_display: YearDisplayMode,
    year_selection: YearSelectionMode,
  ) -> Result<Self, RuleError> {
    let template = HeaderTemplate::parse(document);
    let validator = compile_validator(&template, &BLOCK_COMMENT).map_err(|source| RuleError::Validator { source })?;
    let selector = compile_selector(&template).map_err(|source| RuleError::Selector { source })?;

    Ok(Self {
      year_display: template.metadata_value(YEAR_DISPLAY_KEY, year_display),
      year_selection: template.metadata_value(YEAR_SELECTION_KEY, year_selection),
      template,
      validator,
      selector,
    })
  }

  /// Loads and compiles a template.
  pub fn from_source(
    source: &TemplateSource,
    year_display: YearDisplayMode,
    year_selection: YearSelectionMode,
  ) -> Result<Self, RuleError> {
    Self::with_defaults(&source.load()?, year_display, year_selection)
  }

  pub const fn template(&self) -> &HeaderTemplate {
    &self.template
  }

  pub const fn validator(&self) -> &Regex {
    &self.validator
  }

  pub const fn selector(&self) -> Option<&Regex> {
    self.selector.as_ref()
  }

  pub const fn year_display(&self) -> YearDisplayMode {
    self.year_display
  }

  pub const fn year_selection(&self) -> YearSelectionMode {
    self.year_selection
  }

  /// Whether this rule applies to `content`.
  ///
  /// A rule without `match_from` metadata applies to everything. Otherwise the
  /// file must start with a selector match or already carry this rule's header.
  pub fn matches(&self, content: &str) -> bool {
    match &self.selector {
      None => true,
      Some(selector) => selector.is_match(content) || self.validator.is_match(content),
    }
  }

  /// Whether `content` starts with a valid header for this rule.
  pub fn validate(&self, content: &str) -> bool {
    self.validator.is_match(content)
  }

  /// The year field of the valid header at the start of `content`, if any.
  pub fn year_field<'a>(&self, content: &'a str) -> Option<&'a str> {
    self
      .validator
      .captures(content)
      .and_then(|captures| captures.get(1))
      .map(|field| field.as_str())
  }

  /// Year string for the header of `content` given its modification year.
  pub fn year_string(&self, content: &str, observed_year: i32) -> String {
    render_year_field(self.year_field(content), observed_year, self.year_display)
  }

  /// Renders the complete header comment, including the trailing blank line.
  pub fn render_header(&self, year: &str) -> String {
    let lines = self.template.render_lines(&[(YEAR_KEY, year)]);
    BLOCK_COMMENT.render(&lines, self.template.line_separator())
  }

  /// Formats `content` with this rule's header.
  pub fn format(&self, content: &str, language: Language, observed_year: i32) -> FormatOutcome {
    rewrite::rewrite(self, content, language, observed_year)
  }
}

/// Collects rules during configuration.
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
  rules: Vec<LicenseRule>,
}

impl RuleSetBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a rule after all previously registered ones.
  pub fn rule(&mut self, rule: LicenseRule) -> &mut Self {
    self.rules.push(rule);
    self
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Freezes the registered rules.
  pub fn build(self) -> RuleSet {
    RuleSet {
      rules: self.rules.into(),
    }
  }
}

/// An immutable, ordered set of license rules. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct RuleSet {
  rules: Arc<[LicenseRule]>,
}

impl RuleSet {
  pub fn rules(&self) -> &[LicenseRule] {
    &self.rules
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// The first rule, in registration order, that applies to `content`.
  pub fn select(&self, content: &str) -> Option<&LicenseRule> {
    self.rules.iter().find(|rule| rule.matches(content))
  }

  /// Validates `content` against its selected rule.
  ///
  /// Content no rule applies to is invalid.
  pub fn validate(&self, content: &str) -> bool {
    self.select(content).is_some_and(|rule| rule.validate(content))
  }

  /// Formats `content` with its selected rule.
  ///
  /// `observed_year` is only consulted once a rule has been selected.
  pub fn format(
    &self,
    content: &str,
    language: Language,
    observed_year: impl FnOnce(&LicenseRule) -> i32,
  ) -> FormatOutcome {
    match self.select(content) {
      Some(rule) => rule.format(content, language, observed_year(rule)),
      None => FormatOutcome::Unchanged,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const JAVA: &str = "package com.example;\n\nclass A {}\n";

  #[test]
  fn test_metadata_overrides_defaults() {
    let rule = LicenseRule::with_defaults(
      "Copyright ${YEAR}\n;;year_display: list\n",
      YearDisplayMode::LenientRange,
      YearSelectionMode::File,
    )
    .expect("rule compiles");

    assert_eq!(rule.year_display(), YearDisplayMode::List);
    assert_eq!(rule.year_selection(), YearSelectionMode::File);
  }

  #[test]
  fn test_default_modes() {
    let rule = LicenseRule::new("Copyright ${YEAR}\n").expect("rule compiles");
    assert_eq!(rule.year_display(), YearDisplayMode::LatestOnly);
    assert_eq!(rule.year_selection(), YearSelectionMode::Project);
    assert!(rule.selector().is_none());
  }

  #[test]
  fn test_invalid_match_from_is_rejected() {
    let err = LicenseRule::new("X\n;;match_from: (unclosed\n").expect_err("must fail");
    assert!(matches!(err, RuleError::Selector { .. }));
  }

  #[test]
  fn test_matches_with_selector_or_existing_header() {
    let rule = LicenseRule::new("Copyright ${YEAR} A\n;;match_from: package com\\.a\n").expect("rule compiles");

    assert!(rule.matches("package com.a;\n"));
    assert!(!rule.matches(JAVA));
    assert!(rule.matches("/*\n * Copyright 2020 A\n */\n\npackage com.b;\n"));
  }

  #[test]
  fn test_year_field_capture() {
    let rule = LicenseRule::new("Copyright ${YEAR} A\n").expect("rule compiles");
    let content = "/*\n * Copyright 2019-2021, 2023 A\n */\n\npackage a;\n";

    assert_eq!(rule.year_field(content), Some("2019-2021, 2023"));
    assert_eq!(rule.year_field(JAVA), None);
    assert_eq!(rule.year_string(content, 2024), "2024");
  }

  #[test]
  fn test_format_replaces_stale_header() {
    let rule = LicenseRule::new("Copyright ${YEAR} A\n;;year_display: lenient_range\n").expect("rule compiles");
    let content = "/*\n * Copyright 2020 A\n */\n\npackage a;\n";

    assert_eq!(
      rule.format(content, Language::Java, 2024),
      FormatOutcome::Changed("/*\n * Copyright 2020-2024 A\n */\n\npackage a;\n".to_string())
    );
  }

  #[test]
  fn test_format_replaces_foreign_header() {
    let rule = LicenseRule::new("Copyright ${YEAR} A\n").expect("rule compiles");
    let content = "/* Old license, 1999 */\n\npackage a;\n";

    assert_eq!(
      rule.format(content, Language::Java, 2024),
      FormatOutcome::Changed("/*\n * Copyright 2024 A\n */\n\npackage a;\n".to_string())
    );
  }

  #[test]
  fn test_format_without_package_is_not_applicable() {
    let rule = LicenseRule::new("Copyright ${YEAR} A\n").expect("rule compiles");
    assert_eq!(rule.format("class A {}\n", Language::Java, 2024), FormatOutcome::NotApplicable);
  }

  #[test]
  fn test_first_matching_rule_wins() {
    let mut builder = RuleSetBuilder::new();
    builder
      .rule(LicenseRule::new("First\n;;match_from: package com\\.first\n").expect("rule compiles"))
      .rule(LicenseRule::new("Second\n").expect("rule compiles"))
      .rule(LicenseRule::new("Third\n").expect("rule compiles"));
    assert_eq!(builder.len(), 3);
    let rules = builder.build();

    let first = rules.select("package com.first;\n").expect("selected");
    assert_eq!(first.template().body(), "First");
    let second = rules.select(JAVA).expect("selected");
    assert_eq!(second.template().body(), "Second");
  }

  #[test]
  fn test_empty_rule_set() {
    let rules = RuleSetBuilder::new().build();

    assert!(rules.is_empty());
    assert!(!rules.validate(JAVA));
    assert_eq!(
      rules.format(JAVA, Language::Java, |_| unreachable!("no rule selected")),
      FormatOutcome::Unchanged
    );
  }

  #[test]
  fn test_rule_set_format_uses_selected_rule_modes() {
    let mut builder = RuleSetBuilder::new();
    builder.rule(LicenseRule::new("Copyright ${YEAR}\n;;year_selection: file\n").expect("rule compiles"));
    let rules = builder.build();

    let outcome = rules.format(JAVA, Language::Java, |rule| match rule.year_selection() {
      YearSelectionMode::File => 2001,
      YearSelectionMode::Project => 2002,
    });
    assert_eq!(
      outcome,
      FormatOutcome::Changed(format!("/*\n * Copyright 2001\n */\n\n{JAVA}"))
    );
  }
}
