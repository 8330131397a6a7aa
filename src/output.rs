//! # Output Module
//!
//! All user-facing output of the `check` and `apply` commands.
//!
//! Normal output lists what needs attention and a one-line summary. `-q`
//! reduces it to bare paths for scripting; `-v` adds timing and every file's
//! status.

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileReport, FileStatus, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Success/valid header
  pub const SUCCESS: &str = "\u{2713}";
  /// Failed check
  pub const FAILURE: &str = "\u{2717}";
  /// Skipped file
  pub const SKIPPED: &str = "-";
  /// Rewritten header
  pub const UPDATED: &str = "\u{21bb}";
}

/// Print the initial "Checking N files..." or "Applying ... N files..." message.
pub fn print_start_message(file_count: usize, apply: bool) {
  if is_quiet() {
    return;
  }

  let files_word = if file_count == 1 { "file" } else { "files" };
  if apply {
    println!("Applying license headers to {file_count} {files_word}...");
  } else {
    println!("Checking license headers of {file_count} {files_word}...");
  }
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print every file that failed a check, in pass order.
pub fn print_failed_checks(reports: &[FileReport], project_root: &Path) {
  for report in reports.iter().filter(|r| r.status.is_failure()) {
    let display_path = make_relative_path(&report.path, project_root);
    if is_quiet() {
      println!("{display_path}");
      continue;
    }

    println!(
      " {} {} - license checks have failed ({}).",
      symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()),
      display_path,
      report.status.describe()
    );
  }
}

/// Print every file rewritten by an apply pass.
pub fn print_updated_files(reports: &[FileReport], project_root: &Path) {
  for report in reports.iter().filter(|r| r.status == FileStatus::Updated) {
    let display_path = make_relative_path(&report.path, project_root);
    if is_quiet() {
      println!("{display_path}");
    } else {
      println!(
        " {} Updated file {}",
        symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
        display_path
      );
    }
  }
}

/// Print each file with its status. Only shown in verbose mode.
pub fn print_file_statuses(reports: &[FileReport], project_root: &Path) {
  if !is_verbose() {
    return;
  }

  for report in reports {
    let display_path = make_relative_path(&report.path, project_root);
    let symbol = match report.status {
      FileStatus::Valid | FileStatus::Unchanged => symbols::SUCCESS
        .if_supports_color(Stream::Stderr, |s| s.green())
        .to_string(),
      FileStatus::Updated => symbols::UPDATED
        .if_supports_color(Stream::Stderr, |s| s.yellow())
        .to_string(),
      FileStatus::NotApplicable => symbols::SKIPPED
        .if_supports_color(Stream::Stderr, |s| s.dimmed())
        .to_string(),
      FileStatus::MissingHeader | FileStatus::InvalidHeader | FileStatus::NoMatchingRule => symbols::FAILURE
        .if_supports_color(Stream::Stderr, |s| s.red())
        .to_string(),
    };
    eprintln!("  {} {} ({})", symbol, display_path, report.status.describe());
  }
}

/// Print the closing line of a successful check.
pub fn print_all_checks_passed(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  println!(
    "{} All license header checks passed ({} {}).{}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    summary.total,
    if summary.total == 1 { "file" } else { "files" },
    timing(summary)
  );
}

/// Print the closing line of an apply pass.
pub fn print_apply_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  println!(
    "Updated {} out of {} files.{}",
    summary.updated.if_supports_color(Stream::Stdout, |s| s.cyan()),
    summary.total,
    timing(summary)
  );
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

fn timing(summary: &ProcessingSummary) -> String {
  if is_verbose() {
    format!(" ({}ms)", summary.elapsed_ms)
  } else {
    String::new()
  }
}

/// Formats `path` relative to `base` when possible.
pub fn make_relative_path(path: &Path, base: &Path) -> String {
  match pathdiff::diff_paths(path, base) {
    Some(relative) if !relative.as_os_str().is_empty() && !relative.starts_with("..") => {
      relative.display().to_string()
    }
    _ => path.display().to_string(),
  }
}
