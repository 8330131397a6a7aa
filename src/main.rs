//! # licenser
//!
//! Checks and applies license headers on JVM source files.

mod cli;

use anyhow::Result;

use crate::cli::{Cli, Command, run_apply, run_check};

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse_args();

  match cli.command {
    Command::Check(args) => run_check(args).await,
    Command::Apply(args) => run_apply(args).await,
  }
}
