//! # Workspace Module
//!
//! The project root licenser operates on. Configuration, source roots, rule
//! templates and the backup directory are all resolved against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::git::{self, FixedYear, GitYearSource, YearSource};

/// Project root selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workspace {
  /// Project inside a git work tree.
  Git { root: PathBuf },
  /// Project outside of version control.
  Directory { root: PathBuf },
}

impl Workspace {
  pub fn root(&self) -> &Path {
    match self {
      Self::Git { root } | Self::Directory { root } => root.as_path(),
    }
  }

  pub const fn is_git(&self) -> bool {
    matches!(self, Self::Git { .. })
  }

  /// Year source for this project.
  ///
  /// `pinned` overrides version control entirely. Without git every file was
  /// modified this year.
  pub fn year_source(&self, pinned: Option<i32>) -> Arc<dyn YearSource> {
    match (pinned, self) {
      (Some(year), _) => Arc::new(FixedYear(year)),
      (None, Self::Git { root }) => Arc::new(GitYearSource::new(root.clone())),
      (None, Self::Directory { .. }) => Arc::new(FixedYear::current()),
    }
  }
}

/// Resolves the project root: `explicit_root` if given, else the current
/// directory.
pub fn resolve_workspace(explicit_root: Option<&Path>) -> Result<Workspace> {
  let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;
  let root = match explicit_root {
    Some(root) if root.is_absolute() => root.to_path_buf(),
    Some(root) => current_dir.join(root),
    None => current_dir,
  };

  if !root.is_dir() {
    anyhow::bail!("Project root is not a directory: {}", root.display());
  }

  if git::discover_repo_root(&root)?.is_some() {
    return Ok(Workspace::Git { root });
  }

  Ok(Workspace::Directory { root })
}
