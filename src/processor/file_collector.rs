//! # File Collector Module
//!
//! Enumerates the source files of a pass: every file below the configured
//! source roots that passes the source filter, in a stable order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::file_filter::FileFilter;

/// A file to process, together with the source root it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
  /// Absolute path of the file.
  pub path: PathBuf,
  /// Absolute path of the source root containing it.
  pub root: PathBuf,
}

impl SourceFile {
  /// Path relative to the source root.
  pub fn relative_path(&self) -> &Path {
    self.path.strip_prefix(&self.root).unwrap_or(&self.path)
  }
}

/// Collects source files below a set of roots.
pub struct FileCollector {
  /// Base for relative roots.
  project_root: PathBuf,
  filter: Box<dyn FileFilter>,
  /// Directories never descended into, e.g. the backup directory.
  skipped_dirs: Vec<PathBuf>,
}

impl FileCollector {
  pub fn new(project_root: PathBuf, filter: Box<dyn FileFilter>) -> Self {
    Self {
      project_root,
      filter,
      skipped_dirs: Vec::new(),
    }
  }

  /// Excludes everything below `dir`, relative to the project root unless
  /// absolute.
  pub fn skip_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.skipped_dirs.push(absolutize_path(dir.as_ref(), &self.project_root));
    self
  }

  /// Collects files below `roots`.
  ///
  /// A root may be a directory, scanned recursively in file name order, or a
  /// single file, which is its own entry with its parent as source root.
  /// Files reachable from several roots are reported once, for the first
  /// root.
  ///
  /// # Errors
  ///
  /// Returns an error if a root does not exist or a directory cannot be read.
  pub fn collect(&self, roots: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for root in roots {
      let root = absolutize_path(root, &self.project_root);

      if root.is_file() {
        let parent = root.parent().map_or_else(|| self.project_root.clone(), Path::to_path_buf);
        let file = SourceFile { path: root, root: parent };
        if self.admits(&file)? && seen.insert(file.path.clone()) {
          files.push(file);
        }
        continue;
      }

      if !root.is_dir() {
        anyhow::bail!("Source root does not exist: {}", root.display());
      }

      debug!("Scanning source root: {}", root.display());
      let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !self.is_skipped(entry.path()));
      for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if !entry.file_type().is_file() {
          continue;
        }

        let file = SourceFile {
          path: entry.into_path(),
          root: root.clone(),
        };
        if self.admits(&file)? && seen.insert(file.path.clone()) {
          files.push(file);
        }
      }
    }

    debug!("Collected {} source files", files.len());
    Ok(files)
  }

  fn is_skipped(&self, path: &Path) -> bool {
    let skipped = self.skipped_dirs.iter().any(|dir| path.starts_with(dir));
    if skipped {
      trace!("Skipping {}: excluded directory", path.display());
    }
    skipped
  }

  fn admits(&self, file: &SourceFile) -> Result<bool> {
    let result = self.filter.should_process(file.relative_path())?;
    if let Some(reason) = &result.reason {
      trace!("Skipping {}: {}", file.path.display(), reason);
    }
    Ok(result.should_process)
  }
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn absolutize_path(path: &Path, base: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    base.join(path)
  }
}
