//! # Backup Module
//!
//! Before `apply` overwrites a file, the original is copied below a backup
//! directory, mirroring its path relative to the project root. A file that
//! cannot be backed up is never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;

/// Backup directory used when none is configured, relative to the project root.
pub const DEFAULT_BACKUP_DIR: &str = "target/licenser";

#[derive(Debug, Error)]
pub enum BackupError {
  #[error("Cannot backup file {path}: it is not inside the project root {root}")]
  OutsideRoot { path: PathBuf, root: PathBuf },

  #[error("Cannot backup file {path}, abandoning formatting: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Deterministic backup locations for a project.
#[derive(Debug, Clone)]
pub struct BackupStore {
  root: PathBuf,
  dir: PathBuf,
}

impl BackupStore {
  /// Creates a store for the project at `root`.
  ///
  /// A relative `dir` is resolved against `root`.
  pub fn new(root: impl Into<PathBuf>, dir: impl AsRef<Path>) -> Self {
    let root = root.into();
    let dir = root.join(dir);
    Self { root, dir }
  }

  /// A store using [`DEFAULT_BACKUP_DIR`].
  pub fn with_default_dir(root: impl Into<PathBuf>) -> Self {
    Self::new(root, DEFAULT_BACKUP_DIR)
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Where the backup of `path` is stored.
  ///
  /// # Errors
  ///
  /// Returns [`BackupError::OutsideRoot`] if `path` is not below the project root.
  pub fn backup_path(&self, path: &Path) -> Result<PathBuf, BackupError> {
    let relative = path.strip_prefix(&self.root).map_err(|_| BackupError::OutsideRoot {
      path: path.to_path_buf(),
      root: self.root.clone(),
    })?;
    Ok(self.dir.join(relative))
  }

  /// Copies `path` to its backup location, creating directories as needed.
  ///
  /// Returns the backup location.
  pub fn preserve(&self, path: &Path) -> Result<PathBuf, BackupError> {
    let backup = self.backup_path(path)?;
    let io_error = |source| BackupError::Io {
      path: path.to_path_buf(),
      source,
    };

    if let Some(parent) = backup.parent() {
      fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::copy(path, &backup).map_err(io_error)?;

    trace!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
  }
}
