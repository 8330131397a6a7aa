//! # Configuration Module
//!
//! Project configuration for licenser, read from a `.licenser.toml` file in
//! the project root, from the file named by the `LICENSER_CONFIG` environment
//! variable, or from an explicit `--config` path.
//!
//! ```toml
//! sources = ["src/main/java", "src/test/java"]
//! exclude = ["**/generated/**"]
//! backup-dir = "target/licenser"
//!
//! [[rule]]
//! file = "codeformat/HEADER"
//! year-display = "list"
//!
//! [[rule]]
//! text = "Copyright ${YEAR} Example Corp."
//! year-selection = "file"
//! ```
//!
//! A loaded [`Config`] is resolved against the project root into [`Settings`]:
//! the source filter plus the rules registered so far. Further rules can be
//! registered on the settings before they are frozen into a rule set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::backup::DEFAULT_BACKUP_DIR;
use crate::file_filter::PatternFilter;
use crate::rule::{LicenseRule, RuleSetBuilder};
use crate::template::TemplateSource;
use crate::verbose_log;
use crate::year::{YearDisplayMode, YearSelectionMode};

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".licenser.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "LICENSER_CONFIG";

/// Source root used when none is configured and it exists.
pub const DEFAULT_SOURCE_DIR: &str = "src";

/// One `[[rule]]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuleConfig {
  /// Template file, relative to the project root.
  #[serde(default)]
  pub file: Option<PathBuf>,

  /// Inline template text.
  #[serde(default)]
  pub text: Option<String>,

  /// Display mode used unless the template names one.
  #[serde(default)]
  pub year_display: Option<YearDisplayMode>,

  /// Selection mode used unless the template names one.
  #[serde(default)]
  pub year_selection: Option<YearSelectionMode>,
}

impl RuleConfig {
  /// The template this rule is compiled from, if exactly one is named.
  pub fn source(&self) -> Option<TemplateSource> {
    match (&self.file, &self.text) {
      (Some(file), None) => Some(TemplateSource::File(file.clone())),
      (None, Some(text)) => Some(TemplateSource::Text(text.clone())),
      _ => None,
    }
  }
}

fn default_true() -> bool {
  true
}

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// Directories (or single files) to scan, relative to the project root.
  #[serde(default)]
  pub sources: Vec<PathBuf>,

  /// Globs a file must match, relative to its source root. Empty admits all.
  #[serde(default)]
  pub include: Vec<String>,

  /// Globs excluding files, relative to their source root.
  #[serde(default)]
  pub exclude: Vec<String>,

  /// Whether the built-in exclusion list applies.
  #[serde(default = "default_true")]
  pub default_excludes: bool,

  /// Where `apply` stores originals before rewriting them.
  #[serde(default)]
  pub backup_dir: Option<PathBuf>,

  /// License rules, in priority order.
  #[serde(default, rename = "rule")]
  pub rules: Vec<RuleConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      sources: Vec::new(),
      include: Vec::new(),
      exclude: Vec::new(),
      default_excludes: true,
      backup_dir: None,
      rules: Vec::new(),
    }
  }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  #[error("Invalid rule #{index}: {message}")]
  InvalidRule { index: usize, message: String },
}

impl Config {
  /// Loads and validates a configuration file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
      path: path.to_path_buf(),
      source,
    })?;

    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
      path: path.to_path_buf(),
      source,
    })?;

    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    for (index, rule) in self.rules.iter().enumerate() {
      let message = match (&rule.file, &rule.text) {
        (Some(_), Some(_)) => "set either `file` or `text`, not both",
        (None, None) => "one of `file` or `text` is required",
        _ => continue,
      };
      return Err(ConfigError::InvalidRule {
        index: index + 1,
        message: message.to_string(),
      });
    }
    Ok(())
  }

  /// Resolves this configuration against the project root.
  ///
  /// Rule templates are loaded and compiled here, so any broken rule fails the
  /// whole run before files are touched.
  pub fn resolve(&self, root: &Path) -> Result<Settings> {
    let mut settings = Settings::new(root, self.default_excludes)?;

    for pattern in &self.include {
      settings.filter.include(pattern)?;
    }
    for pattern in &self.exclude {
      settings.filter.exclude(pattern)?;
    }
    if let Some(dir) = &self.backup_dir {
      settings.backup_dir = root.join(dir);
    }
    settings.sources = self.sources.iter().map(|source| root.join(source)).collect();

    for (index, rule) in self.rules.iter().enumerate() {
      let source = rule.source().ok_or_else(|| ConfigError::InvalidRule {
        index: index + 1,
        message: "one of `file` or `text` is required".to_string(),
      })?;
      settings.register(
        source.relative_to(root),
        rule.year_display.unwrap_or_default(),
        rule.year_selection.unwrap_or_default(),
      )?;
    }

    Ok(settings)
  }
}

/// Resolved settings: which files to look at and which rules to apply.
#[derive(Debug)]
pub struct Settings {
  /// Include/exclude globs.
  pub filter: PatternFilter,
  /// Rules registered so far.
  pub rules: RuleSetBuilder,
  /// Absolute source roots; empty means the default source root.
  pub sources: Vec<PathBuf>,
  /// Absolute backup directory.
  pub backup_dir: PathBuf,
}

impl Settings {
  /// Settings with no rules and no patterns besides, optionally, the default
  /// excludes.
  pub fn new(root: &Path, default_excludes: bool) -> Result<Self> {
    let filter = if default_excludes {
      PatternFilter::with_default_excludes()?
    } else {
      PatternFilter::new()
    };

    Ok(Self {
      filter,
      rules: RuleSetBuilder::new(),
      sources: Vec::new(),
      backup_dir: root.join(DEFAULT_BACKUP_DIR),
    })
  }

  /// Loads, compiles and registers a rule after the existing ones.
  pub fn register(
    &mut self,
    source: TemplateSource,
    year_display: YearDisplayMode,
    year_selection: YearSelectionMode,
  ) -> Result<&mut Self> {
    verbose_log!("Registering license rule from {}", source.describe());
    let rule = LicenseRule::from_source(&source, year_display, year_selection)
      .with_context(|| format!("Failed to build license rule from {}", source.describe()))?;
    self.rules.rule(rule);
    Ok(self)
  }

  /// Source roots to scan, falling back to `src` (or the root itself).
  pub fn source_roots(&self, root: &Path) -> Vec<PathBuf> {
    if !self.sources.is_empty() {
      return self.sources.clone();
    }

    let default = root.join(DEFAULT_SOURCE_DIR);
    if default.is_dir() {
      vec![default]
    } else {
      vec![root.to_path_buf()]
    }
  }
}

/// Discovers the config file path.
///
/// Resolution order:
/// 1. The explicit path (from `--config`)
/// 2. The `LICENSER_CONFIG` environment variable
/// 3. `.licenser.toml` in the project root
pub fn discover_config_path(explicit_path: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    verbose_log!("Using explicit config path: {}", path.display());
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let project_config = project_root.join(DEFAULT_CONFIG_FILENAME);
  if project_config.exists() {
    verbose_log!("Using project config: {}", project_config.display());
    return Some(project_config);
  }

  verbose_log!("No config file found");
  None
}

/// Loads the configuration, if any.
///
/// An explicit path that cannot be read is an error; a missing discovered
/// config is not.
pub fn load_config(explicit_path: Option<&Path>, project_root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, project_root) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_parse_full_config() {
    let config: Config = toml::from_str(
      r#"
sources = ["src/main/java"]
include = ["com/**"]
exclude = ["**/generated/**"]
default-excludes = false
backup-dir = "build/backup"

[[rule]]
file = "HEADER"
year-display = "list"

[[rule]]
text = "Copyright ${YEAR}"
year-selection = "file"
"#,
    )
    .expect("config parses");

    assert_eq!(config.sources, [PathBuf::from("src/main/java")]);
    assert!(!config.default_excludes);
    assert_eq!(config.backup_dir, Some(PathBuf::from("build/backup")));
    assert_eq!(config.rules.len(), 2);
    assert_eq!(config.rules[0].year_display, Some(YearDisplayMode::List));
    assert_eq!(config.rules[1].year_selection, Some(YearSelectionMode::File));
    assert_eq!(
      config.rules[1].source(),
      Some(TemplateSource::Text("Copyright ${YEAR}".to_string()))
    );
  }

  #[test]
  fn test_parse_empty_config() {
    let config: Config = toml::from_str("").expect("empty config parses");
    assert_eq!(config, Config::default());
    assert!(config.default_excludes);
  }

  #[test]
  fn test_unknown_keys_are_rejected() {
    assert!(toml::from_str::<Config>("colour = true").is_err());
    assert!(toml::from_str::<Config>("[[rule]]\ntext = \"x\"\nyear-display = \"sometimes\"").is_err());
  }

  #[test]
  fn test_rule_needs_exactly_one_template() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);

    fs::write(&path, "[[rule]]\nyear-display = \"list\"\n").expect("write");
    assert!(matches!(
      Config::load(&path),
      Err(ConfigError::InvalidRule { index: 1, .. })
    ));

    fs::write(&path, "[[rule]]\nfile = \"A\"\ntext = \"B\"\n").expect("write");
    assert!(matches!(
      Config::load(&path),
      Err(ConfigError::InvalidRule { index: 1, .. })
    ));
  }

  #[test]
  fn test_resolve_registers_rules_in_order() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("HEADER"), "From file ${YEAR}\n;;year_display: list\n").expect("write");

    let config: Config = toml::from_str(
      "backup-dir = \"out\"\n[[rule]]\nfile = \"HEADER\"\n[[rule]]\ntext = \"Inline\"\nyear-selection = \"file\"\n",
    )
    .expect("config parses");
    let settings = config.resolve(dir.path()).expect("resolves");

    assert_eq!(settings.backup_dir, dir.path().join("out"));
    let rules = settings.rules.build();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.rules()[0].template().body(), "From file ${YEAR}");
    assert_eq!(rules.rules()[0].year_display(), YearDisplayMode::List);
    assert_eq!(rules.rules()[1].year_selection(), YearSelectionMode::File);
  }

  #[test]
  fn test_resolve_reports_missing_template() {
    let dir = TempDir::new().expect("tempdir");
    let config: Config = toml::from_str("[[rule]]\nfile = \"MISSING\"\n").expect("config parses");

    let err = config.resolve(dir.path()).expect_err("template is missing");
    assert!(format!("{err:#}").contains("MISSING"));
  }

  #[test]
  fn test_source_roots_default() {
    let dir = TempDir::new().expect("tempdir");
    let settings = Settings::new(dir.path(), true).expect("settings");
    assert_eq!(settings.source_roots(dir.path()), [dir.path().to_path_buf()]);

    fs::create_dir(dir.path().join("src")).expect("mkdir");
    assert_eq!(settings.source_roots(dir.path()), [dir.path().join("src")]);
  }

  #[test]
  fn test_discover_config_in_project_root() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    fs::write(&path, "").expect("write");

    assert_eq!(discover_config_path(None, dir.path()), Some(path));
  }

  #[test]
  fn test_explicit_missing_config_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope.toml");

    assert!(load_config(Some(&missing), dir.path(), false).is_err());
    assert!(load_config(Some(&missing), dir.path(), true).expect("disabled").is_none());
  }
}
