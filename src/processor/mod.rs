//! # Processor Module
//!
//! Runs check and apply passes over source files.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - File reading and writing operations
//! - [`file_collector`] - Source enumeration below the configured roots
//!
//! Each file is handled independently on tokio's blocking pool, a bounded
//! number at a time. Reports come back in input order, so output does not
//! depend on scheduling. The first error ends the pass; files already
//! rewritten stay rewritten.

mod file_collector;
mod file_io;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
pub use file_collector::{FileCollector, SourceFile, absolutize_path};
pub use file_io::FileIO;
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, trace};

use crate::backup::BackupStore;
use crate::diff::DiffManager;
use crate::git::YearSource;
use crate::report::{FileReport, FileStatus};
use crate::rewrite::{FormatOutcome, Language};
use crate::rule::RuleSet;
use crate::year::YearSelectionMode;

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub rules: RuleSet,
  pub years: Arc<dyn YearSource>,
  pub backup: BackupStore,

  /// Maximum number of files in flight.
  pub jobs: usize,

  /// Diff output for failed checks.
  pub diff_manager: Option<DiffManager>,
}

impl ProcessorConfig {
  /// Creates a config with one job per CPU and no diff output.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     jobs: 1,
  ///     ..ProcessorConfig::new(rules, years, backup)
  /// }
  /// ```
  pub fn new(rules: RuleSet, years: Arc<dyn YearSource>, backup: BackupStore) -> Self {
    Self {
      rules,
      years,
      backup,
      jobs: num_cpus::get(),
      diff_manager: None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
  Check,
  Apply,
}

struct Inner {
  rules: RuleSet,
  years: Arc<dyn YearSource>,
  backup: BackupStore,
  diff_manager: Option<DiffManager>,
  files_processed: AtomicUsize,
}

/// Checks and applies license headers. Cloning is cheap and shares state.
#[derive(Clone)]
pub struct Processor {
  inner: Arc<Inner>,
  jobs: usize,
}

impl Processor {
  pub fn new(config: ProcessorConfig) -> Self {
    Self {
      inner: Arc::new(Inner {
        rules: config.rules,
        years: config.years,
        backup: config.backup,
        diff_manager: config.diff_manager,
        files_processed: AtomicUsize::new(0),
      }),
      jobs: config.jobs.max(1),
    }
  }

  pub fn rules(&self) -> &RuleSet {
    &self.inner.rules
  }

  /// Number of files handled so far, across all passes.
  pub fn files_processed(&self) -> usize {
    self.inner.files_processed.load(Ordering::Relaxed)
  }

  /// Validates every file without modifying anything.
  ///
  /// Invalid headers are reported, not raised.
  ///
  /// # Errors
  ///
  /// Returns the first read or diff output error.
  pub async fn check(&self, files: Vec<SourceFile>) -> Result<Vec<FileReport>> {
    self.run(files, Pass::Check).await
  }

  /// Inserts or updates the header of every file that needs it.
  ///
  /// # Errors
  ///
  /// Returns the first read, backup or write error.
  pub async fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<FileReport>> {
    self.run(files, Pass::Apply).await
  }

  async fn run(&self, files: Vec<SourceFile>, pass: Pass) -> Result<Vec<FileReport>> {
    debug!("Running {:?} pass over {} files with {} jobs", pass, files.len(), self.jobs);

    stream::iter(files.into_iter().map(|file| {
      let processor = self.clone();
      async move {
        tokio::task::spawn_blocking(move || processor.process_file(&file, pass))
          .await
          .context("File worker panicked")
          .and_then(std::convert::identity)
      }
    }))
    .buffered(self.jobs)
    .try_collect()
    .await
  }

  fn process_file(&self, file: &SourceFile, pass: Pass) -> Result<FileReport> {
    let report = match pass {
      Pass::Check => self.check_file(file),
      Pass::Apply => self.apply_file(file),
    }?;
    self.inner.files_processed.fetch_add(1, Ordering::Relaxed);
    trace!("{}: {}", file.path.display(), report.status.describe());
    Ok(report)
  }

  /// Checks a single file.
  pub fn check_file(&self, file: &SourceFile) -> Result<FileReport> {
    let path = &file.path;
    let Some(language) = Language::from_path(path) else {
      return Ok(FileReport::new(path, FileStatus::NotApplicable));
    };

    let content = FileIO::read_source(path)?;
    let Some(rule) = self.inner.rules.select(&content) else {
      return Ok(FileReport::new(path, FileStatus::NoMatchingRule));
    };

    if rule.validate(&content) {
      return Ok(FileReport::new(path, FileStatus::Valid));
    }

    let status = if language.comment().find_license_comment(&content).existing.is_some() {
      FileStatus::InvalidHeader
    } else {
      FileStatus::MissingHeader
    };

    if let Some(diff_manager) = &self.inner.diff_manager
      && diff_manager.is_enabled()
    {
      let observed = self.modification_year(rule.year_selection(), path);
      if let FormatOutcome::Changed(updated) = rule.format(&content, language, observed) {
        diff_manager.display_diff(path, &content, &updated)?;
      }
    }

    Ok(FileReport::new(path, status))
  }

  /// Formats a single file, backing it up before it is overwritten.
  pub fn apply_file(&self, file: &SourceFile) -> Result<FileReport> {
    let path = &file.path;
    let Some(language) = Language::from_path(path) else {
      return Ok(FileReport::new(path, FileStatus::NotApplicable));
    };

    let content = FileIO::read_source(path)?;
    let Some(rule) = self.inner.rules.select(&content) else {
      return Ok(FileReport::new(path, FileStatus::NoMatchingRule));
    };

    let observed = self.modification_year(rule.year_selection(), path);
    let status = match rule.format(&content, language, observed) {
      FormatOutcome::Changed(updated) => {
        self.inner.backup.preserve(path)?;
        FileIO::write_source(path, &updated)?;
        FileStatus::Updated
      }
      FormatOutcome::Unchanged => FileStatus::Unchanged,
      FormatOutcome::NotApplicable => FileStatus::NotApplicable,
    };

    Ok(FileReport::new(path, status))
  }

  fn modification_year(&self, selection: YearSelectionMode, path: &Path) -> i32 {
    let year = selection.modification_year(self.inner.years.as_ref(), path);
    debug!("{}: modification year {} ({})", path.display(), year, selection);
    year
  }
}
