//! # Check Command
//!
//! Verifies license headers without touching any file. Exits with an error
//! when at least one file fails.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Args;
use licenser::diff::DiffManager;
use licenser::output::{
  print_all_checks_passed, print_blank_line, print_failed_checks, print_file_statuses, print_hint,
  print_start_message,
};
use licenser::report::{ProcessingSummary, write_json_report};
use licenser::verbose_log;

use super::CommonArgs;
use super::session::{Session, init_output, prepare};

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
  #[command(flatten)]
  pub common: CommonArgs,

  /// Show the diff `apply` would make to each failing file
  #[arg(long)]
  pub show_diff: bool,

  /// Save the diff `apply` would make to a file
  #[arg(long, short = 'o', value_name = "FILE")]
  pub save_diff: Option<PathBuf>,
}

/// Run the check command with the given arguments
pub async fn run_check(args: CheckArgs) -> Result<()> {
  init_output(&args.common);

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff);
  diff_manager.init()?;

  let Some(Session {
    workspace,
    processor,
    files,
  }) = prepare(&args.common, Some(diff_manager))?
  else {
    return Ok(());
  };
  let root = workspace.root();

  print_start_message(files.len(), false);
  let start_time = Instant::now();
  let reports = processor.check(files).await?;
  let summary = ProcessingSummary::from_reports(&reports, start_time.elapsed());
  verbose_log!("Checked {} files in {}ms", summary.total, summary.elapsed_ms);

  print_file_statuses(&reports, root);
  if let Some(path) = &args.common.report_json {
    write_json_report(path, "check", &reports, &summary)?;
    verbose_log!("JSON report written to {}", path.display());
  }

  print_blank_line();
  if summary.failed == 0 {
    print_all_checks_passed(&summary);
    return Ok(());
  }

  print_failed_checks(&reports, root);
  print_blank_line();
  print_hint("Run `licenser apply` to fix them.");
  bail!(
    "License header checks have failed on {} out of {} files.",
    summary.failed,
    summary.total
  )
}
