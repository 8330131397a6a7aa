//! # Report Module
//!
//! Per-file outcomes of a check or apply pass, their summary, and the JSON
//! report written by `--report-json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
  #[serde(with = "path_serialization")]
  pub path: PathBuf,
  pub status: FileStatus,
}

impl FileReport {
  pub fn new(path: impl Into<PathBuf>, status: FileStatus) -> Self {
    Self {
      path: path.into(),
      status,
    }
  }
}

/// What a pass found or did for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
  /// The header is valid.
  Valid,
  /// No license comment at the start of the file.
  MissingHeader,
  /// A license comment exists but does not match the selected rule.
  InvalidHeader,
  /// No rule applies to the file.
  NoMatchingRule,
  /// The header was written.
  Updated,
  /// The header was already up to date.
  Unchanged,
  /// The file has no place for a header (no `package` declaration).
  NotApplicable,
}

impl FileStatus {
  /// Whether this status fails a check pass.
  pub const fn is_failure(self) -> bool {
    matches!(
      self,
      FileStatus::MissingHeader | FileStatus::InvalidHeader | FileStatus::NoMatchingRule
    )
  }

  pub fn describe(self) -> &'static str {
    match self {
      FileStatus::Valid => "valid header",
      FileStatus::MissingHeader => "missing header",
      FileStatus::InvalidHeader => "invalid header",
      FileStatus::NoMatchingRule => "no matching rule",
      FileStatus::Updated => "updated",
      FileStatus::Unchanged => "unchanged",
      FileStatus::NotApplicable => "not applicable",
    }
  }
}

mod path_serialization {
  use std::path::Path;

  use serde::Serializer;

  pub fn serialize<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&path.to_string_lossy())
  }
}

/// Totals of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingSummary {
  pub total: usize,
  pub failed: usize,
  pub updated: usize,
  pub elapsed_ms: u128,
}

impl ProcessingSummary {
  pub fn from_reports(reports: &[FileReport], elapsed: Duration) -> Self {
    Self {
      total: reports.len(),
      failed: reports.iter().filter(|r| r.status.is_failure()).count(),
      updated: reports.iter().filter(|r| r.status == FileStatus::Updated).count(),
      elapsed_ms: elapsed.as_millis(),
    }
  }
}

#[derive(Serialize)]
struct JsonReport<'a> {
  command: &'a str,
  generated_at: String,
  summary: &'a ProcessingSummary,
  files: &'a [FileReport],
}

/// Writes a JSON report of a pass to `output_path`.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized or written.
pub fn write_json_report(
  output_path: &Path,
  command: &str,
  files: &[FileReport],
  summary: &ProcessingSummary,
) -> Result<()> {
  let report = JsonReport {
    command,
    generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    summary,
    files,
  };

  let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
  fs::write(output_path, json).with_context(|| format!("Failed to write report: {}", output_path.display()))
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  fn reports() -> Vec<FileReport> {
    vec![
      FileReport::new("A.java", FileStatus::Valid),
      FileReport::new("B.java", FileStatus::MissingHeader),
      FileReport::new("C.java", FileStatus::NoMatchingRule),
      FileReport::new("D.java", FileStatus::Updated),
    ]
  }

  #[test]
  fn test_summary_counts() {
    let summary = ProcessingSummary::from_reports(&reports(), Duration::from_millis(12));

    assert_eq!(summary.total, 4);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.elapsed_ms, 12);
  }

  #[test]
  fn test_json_report() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("report.json");
    let files = reports();
    let summary = ProcessingSummary::from_reports(&files, Duration::ZERO);

    write_json_report(&output, "check", &files, &summary).expect("report written");

    let value: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("valid json");
    assert_eq!(value["command"], "check");
    assert_eq!(value["summary"]["failed"], 2);
    assert_eq!(value["files"][1]["path"], "B.java");
    assert_eq!(value["files"][1]["status"], "missing_header");
  }
}
