//! # Template Module
//!
//! Parsing of license header templates.
//!
//! A template document is the literal header text followed by an optional
//! metadata block. Metadata lines start with `;;` and sit at the end of the
//! document, possibly mixed with blank lines; `;;#` lines are comments:
//!
//! ```text
//! Copyright ${YEAR} Example Corp.
//!
//! Licensed under the Apache License, Version 2.0.
//! ;;# only applies to our own packages
//! ;;match_from: package com\.example
//! ;;year_display: list
//! ;;year_selection: file
//! ```
//!
//! ## Example
//!
//! ```rust
//! use licenser::template::HeaderTemplate;
//! use licenser::year::YearDisplayMode;
//!
//! let template = HeaderTemplate::parse("Copyright ${YEAR} Example\n;;year_display: list\n");
//! assert_eq!(template.body_lines(), ["Copyright ${YEAR} Example"]);
//! assert_eq!(
//!   template.metadata_value("year_display", YearDisplayMode::LatestOnly),
//!   YearDisplayMode::List
//! );
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::rule::RuleError;
use crate::verbose_log;

/// Variable substituted with the copyright year string.
pub const YEAR_KEY: &str = "YEAR";
/// Prefix of a metadata line.
pub const METADATA_MARKER: &str = ";;";
/// Prefix of a metadata comment, ignored entirely.
pub const COMMENT_MARKER: &str = ";;#";
/// Metadata key holding a selector alternative.
pub const MATCH_FROM_KEY: &str = "match_from";

/// Returns the `${NAME}` placeholder for a template variable.
pub fn placeholder(name: &str) -> String {
  format!("${{{name}}}")
}

/// Detects the line separator of a document.
///
/// CRLF wins if present anywhere, then LF, then the platform default.
pub fn line_separator_of(document: &str) -> &'static str {
  if document.contains("\r\n") {
    "\r\n"
  } else if document.contains('\n') {
    "\n"
  } else if cfg!(windows) {
    "\r\n"
  } else {
    "\n"
  }
}

/// A closed set of values a metadata key can take.
///
/// Lookups are case-insensitive against [`MetadataValue::VARIANTS`].
pub trait MetadataValue: Copy + 'static {
  /// Name table, in the spelling used by template documents.
  const VARIANTS: &'static [(&'static str, Self)];

  fn from_name(name: &str) -> Option<Self> {
    Self::VARIANTS
      .iter()
      .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
      .map(|(_, value)| *value)
  }

  fn name(self) -> &'static str
  where
    Self: PartialEq,
  {
    Self::VARIANTS
      .iter()
      .find(|(_, value)| *value == self)
      .map_or("", |(name, _)| name)
  }
}

/// A parsed license header template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
  body_lines: Vec<String>,
  line_separator: &'static str,
  metadata_lines: Vec<String>,
}

impl HeaderTemplate {
  /// Parses a template document.
  ///
  /// The metadata region is found by walking backward from the last line over
  /// blank lines and `;;` lines. The first line always belongs to the body.
  pub fn parse(document: &str) -> Self {
    let line_separator = line_separator_of(document);
    let lines: Vec<&str> = document.split(line_separator).collect();

    let mut body_end = lines.len();
    while body_end > 1 {
      let line = lines[body_end - 1];
      if line.is_empty() || line.starts_with(METADATA_MARKER) {
        body_end -= 1;
      } else {
        break;
      }
    }

    let metadata_lines = lines[body_end..]
      .iter()
      .filter(|line| line.starts_with(METADATA_MARKER) && !line.starts_with(COMMENT_MARKER))
      .map(|line| line[METADATA_MARKER.len()..].to_string())
      .collect();

    Self {
      body_lines: lines[..body_end].iter().map(|line| (*line).to_string()).collect(),
      line_separator,
      metadata_lines,
    }
  }

  /// Header lines, with `${NAME}` placeholders left in place.
  pub fn body_lines(&self) -> &[String] {
    &self.body_lines
  }

  pub const fn line_separator(&self) -> &'static str {
    self.line_separator
  }

  /// Metadata lines with the `;;` marker removed.
  pub fn metadata_lines(&self) -> &[String] {
    &self.metadata_lines
  }

  /// The header body joined with the template's line separator.
  pub fn body(&self) -> String {
    self.body_lines.join(self.line_separator)
  }

  /// Header lines with every `${NAME}` in `variables` substituted.
  pub fn render_lines(&self, variables: &[(&str, &str)]) -> Vec<String> {
    self
      .body_lines
      .iter()
      .map(|line| {
        variables
          .iter()
          .fold(line.clone(), |acc, (name, value)| acc.replace(&placeholder(name), value))
      })
      .collect()
  }

  /// Values of every `key: value` metadata line, in document order.
  pub fn metadata<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self.metadata_lines.iter().filter_map(move |line| metadata_entry(line, key))
  }

  /// Looks up an enumerated metadata value.
  ///
  /// Only the first line carrying `key` is considered; if its value is not a
  /// known name, `default` is returned.
  pub fn metadata_value<T: MetadataValue>(&self, key: &str, default: T) -> T {
    self
      .metadata(key)
      .next()
      .and_then(|value| T::from_name(value.trim()))
      .unwrap_or(default)
  }
}

fn metadata_entry<'a>(line: &'a str, key: &str) -> Option<&'a str> {
  let value = line.trim_start().strip_prefix(key)?.strip_prefix(':')?;
  Some(value.strip_prefix(' ').unwrap_or(value))
}

/// Where a template document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
  /// Literal template text.
  Text(String),
  /// A template file, read as UTF-8.
  File(PathBuf),
}

impl TemplateSource {
  pub fn file(path: impl Into<PathBuf>) -> Self {
    Self::File(path.into())
  }

  /// Loads the template document.
  ///
  /// # Errors
  ///
  /// Returns [`RuleError::Read`] if a template file cannot be read.
  pub fn load(&self) -> Result<String, RuleError> {
    match self {
      TemplateSource::Text(text) => Ok(text.clone()),
      TemplateSource::File(path) => {
        verbose_log!("Loading license header template: {}", path.display());
        fs::read_to_string(path).map_err(|source| RuleError::Read {
          path: path.clone(),
          source,
        })
      }
    }
  }

  /// Human readable origin, used in log output.
  pub fn describe(&self) -> String {
    match self {
      TemplateSource::Text(_) => "<inline>".to_string(),
      TemplateSource::File(path) => path.display().to_string(),
    }
  }

  /// Resolves a relative file path against `base`.
  pub fn relative_to(self, base: &Path) -> Self {
    match self {
      TemplateSource::File(path) if path.is_relative() => TemplateSource::File(base.join(path)),
      other => other,
    }
  }
}
