//! # CLI Module
//!
//! Command-line interface: `licenser check` and `licenser apply`, sharing the
//! project, rule and source options in [`CommonArgs`].

mod apply;
mod check;
mod session;

use std::path::PathBuf;

pub use apply::{ApplyArgs, run_apply};
pub use check::{CheckArgs, run_check};
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Args, Parser, Subcommand};
use licenser::logging::ColorMode;
use licenser::year::{YearDisplayMode, YearSelectionMode};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Check headers using the rules in .licenser.toml
  licenser check

  # Check a single source root against an explicit template
  licenser check --rule codeformat/HEADER src/main/java

  # Show what apply would change
  licenser check --show-diff

  # Insert or update headers, pinning the year
  licenser apply --year 2024

  # Write a JSON report of an apply pass
  licenser apply --report-json licenser-report.json
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Verify that every source file starts with a valid license header
  Check(CheckArgs),
  /// Insert or update license headers in source files
  Apply(ApplyArgs),
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

/// Options shared by all subcommands.
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
  /// Source roots (directories or files) to process instead of the configured
  /// ones, relative to the project root
  #[arg(required = false)]
  pub paths: Vec<PathBuf>,

  /// Project root (default: current directory)
  #[arg(long, value_name = "DIR")]
  pub root: Option<PathBuf>,

  /// Path to config file (default: .licenser.toml in the project root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// License header template file, registered after configured rules
  /// (repeatable)
  #[arg(long, short = 'r', value_name = "FILE")]
  pub rule: Vec<PathBuf>,

  /// Year display mode for --rule templates without their own
  #[arg(long, value_name = "MODE", value_parser = parse_display_mode)]
  pub year_display: Option<YearDisplayMode>,

  /// Year selection mode for --rule templates without their own
  #[arg(long, value_name = "MODE", value_parser = parse_selection_mode)]
  pub year_selection: Option<YearSelectionMode>,

  /// Only process files matching this glob, relative to the source root
  /// (repeatable)
  #[arg(long, value_name = "GLOB")]
  pub include: Vec<String>,

  /// Skip files matching this glob, relative to the source root (repeatable)
  #[arg(long, short = 'e', value_name = "GLOB")]
  pub exclude: Vec<String>,

  /// Do not apply the built-in exclusion list
  #[arg(long)]
  pub no_default_excludes: bool,

  /// Use this year as every file's modification year instead of asking git
  #[arg(long)]
  pub year: Option<i32>,

  /// Number of files processed concurrently (default: number of CPUs)
  #[arg(long, short = 'j')]
  pub jobs: Option<usize>,

  /// Write a JSON report of the pass to this path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

fn parse_display_mode(value: &str) -> Result<YearDisplayMode, String> {
  value.parse().map_err(|e: licenser::year::UnknownModeError| e.to_string())
}

fn parse_selection_mode(value: &str) -> Result<YearSelectionMode, String> {
  value.parse().map_err(|e: licenser::year::UnknownModeError| e.to_string())
}
