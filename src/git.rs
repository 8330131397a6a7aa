//! # Git Module
//!
//! Modification years from version control.
//!
//! A file that is modified or untracked in the work tree was changed this
//! year. Otherwise its modification year is the author year of the most
//! recent commit that touched it, in the author's own time zone. Whenever the
//! repository cannot answer, the current year is used.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, FixedOffset, Local};
use git2::{Commit, ErrorCode, Oid, Repository, Sort, Status, Time, Tree};
use tracing::debug;

/// Source of modification years.
pub trait YearSource: Send + Sync {
    /// One year for the whole project.
    fn project_year(&self) -> i32;

    /// The year `path` was last modified.
    fn file_year(&self, path: &Path) -> i32;
}

/// The current year in the local time zone.
pub fn current_year() -> i32 {
    Local::now().year()
}

/// A year source that always answers with the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedYear(pub i32);

impl FixedYear {
    pub fn current() -> Self {
        Self(current_year())
    }
}

impl YearSource for FixedYear {
    fn project_year(&self) -> i32 {
        self.0
    }

    fn file_year(&self, _path: &Path) -> i32 {
        self.0
    }
}

/// Year source backed by the git repository containing `root`.
///
/// The project year is resolved once and reused for the lifetime of the
/// source, so a pass that rewrites files keeps a stable project year.
#[derive(Debug)]
pub struct GitYearSource {
    root: PathBuf,
    project_year: OnceLock<i32>,
}

impl GitYearSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            project_year: OnceLock::new(),
        }
    }

    fn resolve(&self, path: Option<&Path>) -> i32 {
        match self.modification_year(path) {
            Ok(year) => year,
            Err(e) => {
                debug!("Falling back to the current year: {e:#}");
                current_year()
            }
        }
    }

    /// Looks up the modification year of `path`, or of the whole repository
    /// when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened or walked, or if
    /// `path` lies outside of it.
    pub fn modification_year(&self, path: Option<&Path>) -> Result<i32> {
        let repo = Repository::discover(&self.root)
            .with_context(|| format!("Failed to open git repository at {}", self.root.display()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| anyhow!("Repository at {} has no work tree", self.root.display()))?;

        let relative = path.map(|path| relative_to_workdir(workdir, path)).transpose()?;

        if let Some(relative) = &relative
            && is_modified(&repo, relative)?
        {
            debug!("{} has uncommitted changes", relative.display());
            return Ok(current_year());
        }

        let year = match latest_commit_time(&repo, relative.as_deref())? {
            Some(time) => author_year(time),
            None => None,
        };
        Ok(year.unwrap_or_else(current_year))
    }
}

impl YearSource for GitYearSource {
    fn project_year(&self) -> i32 {
        *self.project_year.get_or_init(|| self.resolve(None))
    }

    fn file_year(&self, path: &Path) -> i32 {
        self.resolve(Some(path))
    }
}

/// Finds the work tree root of the repository containing `dir`, if any.
///
/// # Errors
///
/// Returns an error if a repository exists but cannot be opened.
pub fn discover_repo_root(dir: &Path) -> Result<Option<PathBuf>> {
    match Repository::discover(dir) {
        Ok(repo) => Ok(repo.workdir().map(Path::to_path_buf)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to open git repository at {}", dir.display())),
    }
}

fn relative_to_workdir(workdir: &Path, path: &Path) -> Result<PathBuf> {
    let workdir = fs::canonicalize(workdir).with_context(|| format!("Failed to resolve {}", workdir.display()))?;
    let path = fs::canonicalize(path).with_context(|| format!("Failed to resolve {}", path.display()))?;

    path.strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| anyhow!("{} is outside of the repository {}", path.display(), workdir.display()))
}

fn is_modified(repo: &Repository, relative: &Path) -> Result<bool> {
    let status = repo
        .status_file(relative)
        .with_context(|| format!("Failed to get git status of {}", relative.display()))?;
    Ok(!status.is_empty() && !status.contains(Status::IGNORED))
}

fn latest_commit_time(repo: &Repository, relative: Option<&Path>) -> Result<Option<Time>> {
    if let Err(e) = repo.head() {
        if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) {
            return Ok(None);
        }
        return Err(e).context("Failed to resolve HEAD");
    }

    let mut walk = repo.revwalk().context("Failed to walk history")?;
    walk.push_head()?;
    walk.set_sorting(Sort::TIME)?;

    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        let touched = match relative {
            Some(path) => touches(&commit, path)?,
            None => true,
        };
        if touched {
            return Ok(Some(commit.author().when()));
        }
    }

    Ok(None)
}

/// Whether `commit` changed `path` relative to every one of its parents.
fn touches(commit: &Commit<'_>, path: &Path) -> Result<bool> {
    let current = entry_id(&commit.tree()?, path);
    if commit.parent_count() == 0 {
        return Ok(current.is_some());
    }

    for parent in commit.parents() {
        if entry_id(&parent.tree()?, path) == current {
            return Ok(false);
        }
    }
    Ok(true)
}

fn entry_id(tree: &Tree<'_>, path: &Path) -> Option<Oid> {
    tree.get_path(path).ok().map(|entry| entry.id())
}

fn author_year(time: Time) -> Option<i32> {
    let utc = DateTime::from_timestamp(time.seconds(), 0)?;
    let year = match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset).year(),
        None => utc.year(),
    };
    Some(year)
}
