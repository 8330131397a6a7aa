//! # Diff Module
//!
//! Renders the change `apply` would make to a file whose header fails a
//! check, for `check --show-diff` and `check --save-diff`.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Shows and/or saves unified-style line diffs.
///
/// Files are checked concurrently, so each diff is rendered completely before
/// it is printed or appended, keeping diffs of different files apart.
#[derive(Debug, Default)]
pub struct DiffManager {
  /// Print diffs to stderr.
  pub show_diff: bool,
  /// Append diffs to this file.
  pub save_diff_path: Option<PathBuf>,
  write_lock: Mutex<()>,
}

impl DiffManager {
  pub fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
      write_lock: Mutex::new(()),
    }
  }

  /// Whether diffs are wanted at all.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Truncates the diff file so a run starts from an empty file.
  pub fn init(&self) -> Result<()> {
    if let Some(path) = &self.save_diff_path {
      File::create(path).with_context(|| format!("Failed to create diff file: {}", path.display()))?;
    }
    Ok(())
  }

  /// Renders the diff between `original` and `new` for `path`.
  pub fn render(path: &Path, original: &str, new: &str) -> String {
    let mut rendered = format!("Diff for {}:\n", path.display());
    for change in TextDiff::from_lines(original, new).iter_all_changes() {
      let sign = match change.tag() {
        ChangeTag::Delete => "-",
        ChangeTag::Insert => "+",
        ChangeTag::Equal => " ",
      };
      let _ = write!(rendered, "{sign}{change}");
      if change.missing_newline() {
        rendered.push('\n');
      }
    }
    rendered.push('\n');
    rendered
  }

  /// Prints and/or saves the diff for `path`.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }

    let rendered = Self::render(path, original, new);
    let _guard = self.write_lock.lock().map_err(|_| anyhow!("Diff output lock poisoned"))?;

    if self.show_diff {
      for line in rendered.lines() {
        let colored = match line.chars().next() {
          Some('+') => line.if_supports_color(Stream::Stderr, |l| l.green()).to_string(),
          Some('-') => line.if_supports_color(Stream::Stderr, |l| l.red()).to_string(),
          _ => line.to_string(),
        };
        eprintln!("{colored}");
      }
    }

    if let Some(diff_path) = &self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}
