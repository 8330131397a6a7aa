//! # Year Module
//!
//! Copyright year handling.
//!
//! A header's year field (for example `2019-2021, 2024`) is parsed into a
//! [`YearSet`], the year the file was last modified is merged in, and the
//! result is rendered again according to a [`YearDisplayMode`]. The
//! [`YearSelectionMode`] decides which modification year is merged.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::git::YearSource;
use crate::template::MetadataValue;

/// How a year field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearDisplayMode {
  /// `first-last` of the recorded years, in the order they were recorded.
  LenientRange,
  /// Every distinct year, ascending, comma separated.
  List,
  /// Only the most recently recorded year.
  #[default]
  LatestOnly,
}

impl MetadataValue for YearDisplayMode {
  const VARIANTS: &'static [(&'static str, Self)] = &[
    ("lenient_range", Self::LenientRange),
    ("list", Self::List),
    ("latest_only", Self::LatestOnly),
  ];
}

/// Which modification year a header should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSelectionMode {
  /// One year for the whole project: its latest change.
  #[default]
  Project,
  /// The latest change of the file itself.
  File,
}

impl MetadataValue for YearSelectionMode {
  const VARIANTS: &'static [(&'static str, Self)] = &[("project", Self::Project), ("file", Self::File)];
}

impl YearSelectionMode {
  /// Resolves the modification year of `path` under this policy.
  pub fn modification_year(self, source: &dyn YearSource, path: &Path) -> i32 {
    match self {
      YearSelectionMode::Project => source.project_year(),
      YearSelectionMode::File => source.file_year(path),
    }
  }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{value}', expected one of: {expected}")]
pub struct UnknownModeError {
  value: String,
  expected: String,
}

fn parse_mode<T: MetadataValue>(value: &str) -> Result<T, UnknownModeError> {
  T::from_name(value.trim()).ok_or_else(|| UnknownModeError {
    value: value.to_string(),
    expected: T::VARIANTS.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", "),
  })
}

impl FromStr for YearDisplayMode {
  type Err = UnknownModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse_mode(s)
  }
}

impl FromStr for YearSelectionMode {
  type Err = UnknownModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse_mode(s)
  }
}

impl fmt::Display for YearDisplayMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl fmt::Display for YearSelectionMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Years recorded in a header, in the order they were recorded.
///
/// Ranges are expanded, so `2019-2021, 2020` holds `[2019, 2020, 2021, 2020]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSet {
  years: Vec<i32>,
}

impl YearSet {
  /// Parses a year field.
  ///
  /// Tokens are separated by commas. Years are exactly four digits. A token
  /// containing `-` must be a range of exactly two years with `end >= start`;
  /// anything malformed is dropped without error.
  pub fn parse(field: &str) -> Self {
    let mut years = Vec::new();

    for token in field.split(',').map(str::trim) {
      if token.contains('-') {
        let bounds: Vec<&str> = token.split('-').map(str::trim).collect();
        let [start, end] = bounds.as_slice() else {
          continue;
        };
        let (Some(start), Some(end)) = (parse_year(start), parse_year(end)) else {
          continue;
        };
        if end >= start {
          years.extend(start..=end);
        }
      } else if let Some(year) = parse_year(token) {
        years.push(year);
      }
    }

    Self { years }
  }

  pub fn years(&self) -> &[i32] {
    &self.years
  }

  pub fn contains(&self, year: i32) -> bool {
    self.years.contains(&year)
  }

  /// Records `year` unless it is already present.
  pub fn merge(&mut self, year: i32) {
    if !self.contains(year) {
      self.years.push(year);
    }
  }

  /// Renders the set. An empty set renders as an empty string.
  pub fn render(&self, mode: YearDisplayMode) -> String {
    match mode {
      YearDisplayMode::LatestOnly => self.years.last().map(i32::to_string).unwrap_or_default(),
      YearDisplayMode::List => {
        let mut sorted = self.years.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
      }
      YearDisplayMode::LenientRange => match (self.years.first(), self.years.last()) {
        (Some(first), Some(last)) if self.years.len() > 1 => format!("{first}-{last}"),
        (Some(only), _) => only.to_string(),
        _ => String::new(),
      },
    }
  }
}

fn parse_year(token: &str) -> Option<i32> {
  if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  token.parse().ok()
}

/// Computes the year string for a header.
///
/// Without an `existing` field the observed year is used as is. Otherwise the
/// observed year is merged into the recorded years and rendered with `mode`.
pub fn render_year_field(existing: Option<&str>, observed: i32, mode: YearDisplayMode) -> String {
  let Some(existing) = existing else {
    return observed.to_string();
  };

  let mut years = YearSet::parse(existing);
  years.merge(observed);
  years.render(mode)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_no_existing_field_uses_observed_year() {
    assert_eq!(render_year_field(None, 2024, YearDisplayMode::List), "2024");
    assert_eq!(render_year_field(None, 2024, YearDisplayMode::LenientRange), "2024");
  }

  #[test]
  fn test_list_and_latest_with_known_year() {
    assert_eq!(render_year_field(Some("2020, 2022"), 2022, YearDisplayMode::List), "2020, 2022");
    assert_eq!(render_year_field(Some("2020, 2022"), 2022, YearDisplayMode::LatestOnly), "2022");
  }

  #[test]
  fn test_malformed_tokens_are_dropped() {
    let mut years = YearSet::parse("abcd-2020, 2019");
    years.merge(2021);
    assert_eq!(years.years(), [2019, 2021]);

    assert_eq!(YearSet::parse("2021-2019, 2018-2019-2020, 20x0, , -2020, 2020-").years(), [] as [i32; 0]);
  }

  #[test]
  fn test_years_must_have_four_digits() {
    assert_eq!(YearSet::parse("20245, 2019, 024, 0-2000000000").years(), [2019]);
    assert_eq!(render_year_field(Some("0-2000000000"), 2021, YearDisplayMode::List), "2021");
    assert_eq!(render_year_field(Some("20245, 2019"), 2021, YearDisplayMode::List), "2019, 2021");
  }

  #[test]
  fn test_ranges_expand_inclusively() {
    assert_eq!(YearSet::parse("2018-2020").years(), [2018, 2019, 2020]);
    assert_eq!(YearSet::parse("2018 - 2019 ,2022").years(), [2018, 2019, 2022]);
    assert_eq!(YearSet::parse("2020-2020").years(), [2020]);
  }

  #[test]
  fn test_list_is_sorted_and_distinct() {
    assert_eq!(
      render_year_field(Some("2022, 2019-2021, 2020"), 2018, YearDisplayMode::List),
      "2018, 2019, 2020, 2021, 2022"
    );
  }

  #[test]
  fn test_lenient_range_follows_recorded_order() {
    assert_eq!(render_year_field(Some("2019"), 2023, YearDisplayMode::LenientRange), "2019-2023");
    assert_eq!(render_year_field(Some("2023"), 2023, YearDisplayMode::LenientRange), "2023");
    // Recorded order, not numeric order: the appended year is not the maximum.
    assert_eq!(render_year_field(Some("2024"), 2020, YearDisplayMode::LenientRange), "2024-2020");
  }

  #[test]
  fn test_latest_only_is_last_recorded() {
    // A known year is not re-appended, so the last recorded year wins.
    assert_eq!(render_year_field(Some("2022, 2020"), 2020, YearDisplayMode::LatestOnly), "2020");
    assert_eq!(render_year_field(Some("2019-2021"), 2024, YearDisplayMode::LatestOnly), "2024");
  }

  #[test]
  fn test_everything_malformed_falls_back_to_observed() {
    for mode in [YearDisplayMode::LenientRange, YearDisplayMode::List, YearDisplayMode::LatestOnly] {
      assert_eq!(render_year_field(Some("unknown"), 2024, mode), "2024");
    }
  }

  #[test]
  fn test_mode_names() {
    assert_eq!("LIST".parse::<YearDisplayMode>(), Ok(YearDisplayMode::List));
    assert_eq!(YearDisplayMode::LenientRange.to_string(), "lenient_range");
    assert_eq!(YearSelectionMode::File.to_string(), "file");

    let err = "sometimes".parse::<YearSelectionMode>().expect_err("unknown mode");
    assert_eq!(err.to_string(), "unknown value 'sometimes', expected one of: project, file");
  }

  struct Years;

  impl YearSource for Years {
    fn project_year(&self) -> i32 {
      2020
    }

    fn file_year(&self, _path: &Path) -> i32 {
      2023
    }
  }

  #[test]
  fn test_selection_mode_dispatch() {
    let path = Path::new("Main.java");
    assert_eq!(YearSelectionMode::Project.modification_year(&Years, path), 2020);
    assert_eq!(YearSelectionMode::File.modification_year(&Years, path), 2023);
  }
}
