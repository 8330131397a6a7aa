//! # Pattern Module
//!
//! Compiles a [`HeaderTemplate`] into the regular expressions a license rule
//! runs against file content:
//!
//! - the *validator*, which recognizes a correctly formatted header at the very
//!   start of a file and captures its year field, and
//! - the optional *selector*, built from `match_from` metadata, which decides
//!   whether a rule applies to a file at all.

use regex::Regex;

use crate::comment::{LicenseComment, is_blank};
use crate::template::{HeaderTemplate, MATCH_FROM_KEY, YEAR_KEY, placeholder};

/// One year or an inclusive year range, e.g. `2019` or `2019 - 2021`.
const YEAR_ITEM: &str = r"[0-9]{4}(?: ?- ?[0-9]{4})?";

/// Pattern for a complete year field, e.g. `2019-2021, 2024`.
pub fn year_field_pattern() -> String {
  format!("{YEAR_ITEM}(?: ?, ?{YEAR_ITEM})*")
}

/// Builds the validator pattern source for `template` wrapped in `comment`.
///
/// Every literal character is escaped. The first `${YEAR}` placeholder becomes
/// capture group 1; later ones match a year field without capturing.
pub fn validator_source(template: &HeaderTemplate, comment: &dyn LicenseComment) -> String {
  let separator = regex::escape(template.line_separator());
  let continuation = regex::escape(comment.continuation());
  let year = placeholder(YEAR_KEY);
  let field = year_field_pattern();
  let mut captured = false;

  let mut pattern = String::from("^");
  pattern.push_str(&regex::escape(comment.open()));
  pattern.push_str(&separator);

  for line in template.body_lines() {
    pattern.push_str(&continuation);
    if !is_blank(line) {
      pattern.push(' ');
      for (index, literal) in line.split(year.as_str()).enumerate() {
        if index > 0 {
          if captured {
            pattern.push_str(&format!("(?:{field})"));
          } else {
            pattern.push_str(&format!("({field})"));
            captured = true;
          }
        }
        pattern.push_str(&regex::escape(literal));
      }
    }
    pattern.push_str(&separator);
  }

  pattern.push_str(&regex::escape(comment.close()));
  pattern.push_str(&separator);
  pattern.push_str(&separator);
  pattern
}

/// Compiles the validator for `template`.
pub fn compile_validator(template: &HeaderTemplate, comment: &dyn LicenseComment) -> Result<Regex, regex::Error> {
  Regex::new(&validator_source(template, comment))
}

/// Builds the selector pattern source, or `None` without `match_from` lines.
///
/// Each `match_from` value is one alternative; the whole alternation is
/// anchored at the start of the file.
pub fn selector_source(template: &HeaderTemplate) -> Option<String> {
  let alternatives: Vec<String> = template
    .metadata(MATCH_FROM_KEY)
    .map(|alternative| format!("(?:{alternative})"))
    .collect();

  if alternatives.is_empty() {
    None
  } else {
    Some(format!("^(?:{})", alternatives.join("|")))
  }
}

/// Compiles the selector for `template`, if it has one.
///
/// # Errors
///
/// Returns the regex error of a malformed `match_from` value.
pub fn compile_selector(template: &HeaderTemplate) -> Result<Option<Regex>, regex::Error> {
  selector_source(template).map(|source| Regex::new(&source)).transpose()
}
