//! Shared setup of a check or apply run: logging, project root, configuration,
//! rules, sources and the processor.

use anyhow::Result;
use licenser::backup::BackupStore;
use licenser::config::{Settings, load_config};
use licenser::diff::DiffManager;
use licenser::file_filter::create_source_filter;
use licenser::logging::{init_tracing, set_quiet, set_verbose};
use licenser::processor::{FileCollector, Processor, ProcessorConfig, SourceFile};
use licenser::template::TemplateSource;
use licenser::workspace::{Workspace, resolve_workspace};
use licenser::{info_log, verbose_log};
use tracing::debug;

use super::CommonArgs;

/// Everything a pass needs.
pub struct Session {
  pub workspace: Workspace,
  pub processor: Processor,
  pub files: Vec<SourceFile>,
}

/// Applies the output flags.
pub fn init_output(args: &CommonArgs) {
  args.colors.apply();
  if args.quiet {
    set_quiet();
  } else if args.verbose > 0 {
    set_verbose();
  }
  init_tracing(args.quiet, args.verbose);

  debug!(
    "licenser {} ({} {})",
    env!("CARGO_PKG_VERSION"),
    option_env!("GIT_HASH").unwrap_or("unknown"),
    option_env!("GIT_DATE").unwrap_or("unknown")
  );
}

/// Prepares a pass.
///
/// Returns `None` when no rule is registered; there is nothing to check or
/// apply then.
pub fn prepare(args: &CommonArgs, diff_manager: Option<DiffManager>) -> Result<Option<Session>> {
  let workspace = resolve_workspace(args.root.as_deref())?;
  let root = workspace.root().to_path_buf();
  verbose_log!("Project root: {}", root.display());

  let mut config = load_config(args.config.as_deref(), &root, args.no_config)?;
  if args.no_default_excludes
    && let Some(loaded) = config.as_mut()
  {
    loaded.default_excludes = false;
  }
  let mut settings = match &config {
    Some(loaded) => loaded.resolve(&root)?,
    None => Settings::new(&root, !args.no_default_excludes)?,
  };

  for pattern in &args.include {
    settings.filter.include(pattern)?;
  }
  for pattern in &args.exclude {
    settings.filter.exclude(pattern)?;
  }
  for rule in &args.rule {
    settings.register(
      TemplateSource::file(rule).relative_to(&root),
      args.year_display.unwrap_or_default(),
      args.year_selection.unwrap_or_default(),
    )?;
  }

  if settings.rules.is_empty() {
    info_log!("No license rules configured, nothing to do.");
    return Ok(None);
  }

  let roots = if args.paths.is_empty() {
    settings.source_roots(&root)
  } else {
    args.paths.clone()
  };
  let Settings {
    filter,
    rules,
    backup_dir,
    ..
  } = settings;
  let rules = rules.build();
  verbose_log!("Loaded {} license rules", rules.len());

  let collector =
    FileCollector::new(root.clone(), Box::new(create_source_filter(filter))).skip_dir(&backup_dir);
  let files = collector.collect(&roots)?;

  let mut processor_config = ProcessorConfig::new(
    rules,
    workspace.year_source(args.year),
    BackupStore::new(root.clone(), backup_dir),
  );
  if let Some(jobs) = args.jobs {
    processor_config.jobs = jobs;
  }
  processor_config.diff_manager = diff_manager;

  Ok(Some(Session {
    processor: Processor::new(processor_config),
    workspace,
    files,
  }))
}
