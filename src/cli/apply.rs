//! # Apply Command
//!
//! Inserts missing license headers and updates outdated ones.

use std::time::Instant;

use anyhow::Result;
use clap::Args;
use licenser::output::{print_apply_summary, print_blank_line, print_file_statuses, print_start_message, print_updated_files};
use licenser::report::{ProcessingSummary, write_json_report};
use licenser::verbose_log;

use super::CommonArgs;
use super::session::{Session, init_output, prepare};

/// Arguments for the apply command
#[derive(Args, Debug, Default)]
pub struct ApplyArgs {
  #[command(flatten)]
  pub common: CommonArgs,
}

/// Run the apply command with the given arguments
pub async fn run_apply(args: ApplyArgs) -> Result<()> {
  init_output(&args.common);

  let Some(Session {
    workspace,
    processor,
    files,
  }) = prepare(&args.common, None)?
  else {
    return Ok(());
  };
  let root = workspace.root();

  print_start_message(files.len(), true);
  let start_time = Instant::now();
  let reports = processor.apply(files).await?;
  let summary = ProcessingSummary::from_reports(&reports, start_time.elapsed());

  print_file_statuses(&reports, root);
  if let Some(path) = &args.common.report_json {
    write_json_report(path, "apply", &reports, &summary)?;
    verbose_log!("JSON report written to {}", path.display());
  }

  print_blank_line();
  print_updated_files(&reports, root);
  print_apply_summary(&summary);
  Ok(())
}
