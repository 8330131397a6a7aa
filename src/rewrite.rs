//! # Rewrite Module
//!
//! Produces the new content of a file whose license header is missing or
//! outdated.
//!
//! Everything before the language's insertion point (normally the `package`
//! declaration) is replaced by the rendered header; everything from the
//! insertion point on is kept byte for byte.

use std::path::Path;

use tracing::trace;

use crate::comment::{BLOCK_COMMENT, LicenseComment};
use crate::rule::LicenseRule;

const PACKAGE_KEYWORD: &str = "package";
const FILE_ANNOTATION: &str = "@file";

/// Source languages whose files can carry a license header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
  Java,
  Kotlin,
  Scala,
}

impl Language {
  /// Determines the language from a file extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    match path.extension()?.to_str()? {
      "java" => Some(Language::Java),
      "kt" | "kts" => Some(Language::Kotlin),
      "scala" => Some(Language::Scala),
      _ => None,
    }
  }

  /// Comment dialect used for headers in this language.
  pub fn comment(self) -> &'static dyn LicenseComment {
    &BLOCK_COMMENT
  }

  /// Byte offset where real content starts, i.e. where the header ends.
  ///
  /// This is the first `package` keyword following the existing license
  /// comment, if any. In Kotlin a file-level annotation (`@file:...`) must
  /// precede the package declaration, so an earlier `@file` wins.
  pub fn insertion_point(self, content: &str) -> Option<usize> {
    let leading = self.comment().find_license_comment(content);
    let search_from = if leading.existing.is_some() { leading.end_index } else { 0 };

    let package = search_from + content.get(search_from..)?.find(PACKAGE_KEYWORD)?;

    if self == Language::Kotlin
      && let Some(annotation) = content[search_from..package].find(FILE_ANNOTATION)
    {
      return Some(search_from + annotation);
    }

    Some(package)
  }
}

/// Result of formatting a file's content against a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
  /// The file has no insertion point; it was left alone.
  NotApplicable,
  /// The file already carries the exact header.
  Unchanged,
  /// New file content.
  Changed(String),
}

impl FormatOutcome {
  pub const fn is_changed(&self) -> bool {
    matches!(self, FormatOutcome::Changed(_))
  }
}

/// Formats `content` with `rule`'s header for `language`.
///
/// The year field already present in a valid header is merged with
/// `observed_year`.
pub fn rewrite(rule: &LicenseRule, content: &str, language: Language, observed_year: i32) -> FormatOutcome {
  let Some(insertion_point) = language.insertion_point(content) else {
    trace!("No insertion point found for {language:?} content");
    return FormatOutcome::NotApplicable;
  };

  let year = rule.year_string(content, observed_year);
  trace!("Selected \"{year}\" as the year string");

  let mut updated = rule.render_header(&year);
  updated.push_str(&content[insertion_point..]);

  if updated == content {
    FormatOutcome::Unchanged
  } else {
    FormatOutcome::Changed(updated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_language_from_extension() {
    assert_eq!(Language::from_path(Path::new("src/Main.java")), Some(Language::Java));
    assert_eq!(Language::from_path(Path::new("Main.kt")), Some(Language::Kotlin));
    assert_eq!(Language::from_path(Path::new("build.gradle.kts")), Some(Language::Kotlin));
    assert_eq!(Language::from_path(Path::new("App.scala")), Some(Language::Scala));
    assert_eq!(Language::from_path(Path::new("README")), None);
    assert_eq!(Language::from_path(Path::new("lib.rs")), None);
  }

  #[test]
  fn test_insertion_point_is_package() {
    let content = "// stray comment\npackage a;\n";
    assert_eq!(Language::Java.insertion_point(content), Some(17));
  }

  #[test]
  fn test_insertion_point_skips_existing_header() {
    let content = "/*\n * This package is licensed.\n */\n\npackage a;\n";
    let offset = Language::Java.insertion_point(content).expect("has package");
    assert_eq!(&content[offset..], "package a;\n");
  }

  #[test]
  fn test_kotlin_file_annotation_wins() {
    let content = "@file:JvmName(\"Util\")\n\npackage a\n";
    assert_eq!(Language::Kotlin.insertion_point(content), Some(0));
    assert_eq!(Language::Java.insertion_point(content), Some(23));
  }

  #[test]
  fn test_kotlin_annotation_after_package_is_ignored() {
    let content = "package a\n\n@file:Suppress(\"x\")\n";
    assert_eq!(Language::Kotlin.insertion_point(content), Some(0));
  }

  #[test]
  fn test_no_package_means_no_insertion_point() {
    assert_eq!(Language::Java.insertion_point("class A {}\n"), None);
    assert_eq!(Language::Java.insertion_point("/* unterminated\npackage a;"), None);
  }

  #[test]
  fn test_format_outcome_is_changed() {
    assert!(FormatOutcome::Changed(String::new()).is_changed());
    assert!(!FormatOutcome::Unchanged.is_changed());
    assert!(!FormatOutcome::NotApplicable.is_changed());
  }
}
