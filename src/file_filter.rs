//! # File Filter Module
//!
//! Decides which files under a source root take part in a check or apply pass.
//! Paths handed to a filter are relative to the source root they were found in.

use std::path::Path;

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};

use crate::rewrite::Language;
use crate::verbose_log;

/// Patterns excluded from every pass unless `default-excludes = false`.
///
/// Documentation, data files, images, archives and JVM metadata never carry a
/// license header.
pub const DEFAULT_EXCLUDES: &[&str] = &[
  "**/*.txt",
  "**/*.json",
  "**/*.md",
  "**/*.jpg",
  "**/*.png",
  "**/*.gif",
  "**/*.bmp",
  "**/*.ico",
  "**/*.webp",
  "**/*.qoi",
  "**/*.zip",
  "**/*.jar",
  "**/*.tar",
  "**/*.class",
  "**/*.bin",
  "**/MANIFEST.MF",
  "**/META-INF/services/**",
  "**/package-info.java",
  "**/module-info.java",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Result of a file filtering operation.
#[derive(Debug)]
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
pub trait FileFilter: Send + Sync {
  /// Determines whether a file should be processed.
  ///
  /// # Parameters
  ///
  /// * `path` - The file path, relative to its source root
  ///
  /// # Returns
  ///
  /// A `FilterResult` indicating whether the file should be processed and why
  /// not if applicable.
  fn should_process(&self, path: &Path) -> Result<FilterResult>;
}

/// Include/exclude glob configuration.
///
/// An empty include list admits every file; excludes always win over includes.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
  includes: Vec<Pattern>,
  excludes: Vec<Pattern>,
}

impl PatternFilter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a filter pre-populated with [`DEFAULT_EXCLUDES`].
  pub fn with_default_excludes() -> Result<Self> {
    let mut filter = Self::new();
    for pattern in DEFAULT_EXCLUDES {
      filter.exclude(pattern)?;
    }
    Ok(filter)
  }

  /// Adds an include glob.
  ///
  /// # Errors
  ///
  /// Returns an error if the glob is malformed.
  pub fn include(&mut self, pattern: &str) -> Result<&mut Self> {
    self.includes.push(compile(pattern)?);
    Ok(self)
  }

  /// Adds an exclude glob.
  ///
  /// # Errors
  ///
  /// Returns an error if the glob is malformed.
  pub fn exclude(&mut self, pattern: &str) -> Result<&mut Self> {
    self.excludes.push(compile(pattern)?);
    Ok(self)
  }

  pub fn includes(&self) -> impl Iterator<Item = &str> {
    self.includes.iter().map(Pattern::as_str)
  }

  pub fn excludes(&self) -> impl Iterator<Item = &str> {
    self.excludes.iter().map(Pattern::as_str)
  }
}

fn compile(pattern: &str) -> Result<Pattern> {
  Pattern::new(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))
}

impl FileFilter for PatternFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let normalized = path.to_string_lossy().replace('\\', "/");

    if let Some(pattern) = self.excludes.iter().find(|p| p.matches_with(&normalized, MATCH_OPTIONS)) {
      verbose_log!("Skipping: {} (matches exclude pattern {})", normalized, pattern.as_str());
      return Ok(FilterResult::skip(format!("Matches exclude pattern {}", pattern.as_str())));
    }

    if !self.includes.is_empty() && !self.includes.iter().any(|p| p.matches_with(&normalized, MATCH_OPTIONS)) {
      return Ok(FilterResult::skip("Does not match any include pattern"));
    }

    Ok(FilterResult::process())
  }
}

/// Admits only files whose extension maps to a supported [`Language`].
pub struct LanguageFilter;

impl FileFilter for LanguageFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if Language::from_path(path).is_some() {
      Ok(FilterResult::process())
    } else {
      Ok(FilterResult::skip("Unsupported file type"))
    }
  }
}

/// Filter that combines multiple filters; the first rejection wins.
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  pub fn new(filters: Vec<Box<dyn FileFilter>>) -> Self {
    Self { filters }
  }

  pub fn add_filter(&mut self, filter: Box<dyn FileFilter>) {
    self.filters.push(filter);
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    for filter in &self.filters {
      let result = filter.should_process(path)?;
      if !result.should_process {
        return Ok(result);
      }
    }
    Ok(FilterResult::process())
  }
}

/// Builds the filter used by source enumeration: language support first, then
/// the configured include/exclude globs.
pub fn create_source_filter(patterns: PatternFilter) -> CompositeFilter {
  CompositeFilter::new(vec![Box::new(LanguageFilter), Box::new(patterns)])
}
