//! # Comment Module
//!
//! Locates the leading license comment of a source file and renders header
//! lines in a block comment dialect.
//!
//! A license comment is a block comment opened with `/*` that is the first
//! non-whitespace token of the file. Documentation comments (`/**`) are never
//! treated as license comments, so a file starting with a class-level doc
//! comment is considered to have no header at all.

/// Outcome of scanning the start of a file for a license comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingComment {
  /// Byte offset where the scan stopped.
  ///
  /// For a well-formed comment this is the first non-whitespace character
  /// following the closer. Without a license comment it is the first
  /// non-whitespace character of the file (or the file length). For an
  /// unterminated comment it is the offset of the last character, and the
  /// inner text is kept raw unless the input ends in `*`.
  pub end_index: usize,
  /// Inner text of the license comment, if one was found.
  pub existing: Option<String>,
}

/// A block comment convention used to wrap license headers.
pub trait LicenseComment: Send + Sync {
  /// Opening line of the comment, e.g. `/*`.
  fn open(&self) -> &'static str;

  /// Prefix of each body line, without the separating space, e.g. ` *`.
  fn continuation(&self) -> &'static str;

  /// Closing line of the comment, e.g. ` */`.
  fn close(&self) -> &'static str;

  /// Scans `source` for a leading license comment.
  fn find_license_comment(&self, source: &str) -> LeadingComment;

  /// Renders header lines as a complete comment followed by one blank line.
  ///
  /// Blank lines are rendered as the bare continuation marker so that the
  /// output never carries trailing whitespace.
  fn render(&self, lines: &[String], line_separator: &str) -> String {
    let mut out = String::new();
    out.push_str(self.open());
    out.push_str(line_separator);
    for line in lines {
      out.push_str(self.continuation());
      if !is_blank(line) {
        out.push(' ');
        out.push_str(line);
      }
      out.push_str(line_separator);
    }
    out.push_str(self.close());
    out.push_str(line_separator);
    out.push_str(line_separator);
    out
  }
}

/// Whether a header line is rendered as an empty comment line.
pub fn is_blank(line: &str) -> bool {
  line.trim().is_empty()
}

/// The C-style `/* ... */` comment shared by Java, Kotlin and Scala.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockComment;

pub static BLOCK_COMMENT: BlockComment = BlockComment;

impl LicenseComment for BlockComment {
  fn open(&self) -> &'static str {
    "/*"
  }

  fn continuation(&self) -> &'static str {
    " *"
  }

  fn close(&self) -> &'static str {
    " */"
  }

  fn find_license_comment(&self, source: &str) -> LeadingComment {
    let mut index = 0;
    let mut existing = None;

    while let Some(c) = source[index..].chars().next() {
      let rest = &source[index..];

      if existing.is_none() && rest.starts_with("/*") {
        // `/**` is a doc comment and `/*` at end of input opens nothing.
        if rest.len() == 2 || rest[2..].starts_with('*') {
          break;
        }

        let body_start = index + 2;
        let Some(closer) = source[body_start..].find("*/").map(|offset| body_start + offset) else {
          let body = &source[body_start..];
          // A body cut off right after a `*` is read like a closed one.
          let existing = if body.len() > 1 && body.ends_with('*') {
            strip_comment_prefixes(body)
          } else {
            body.to_string()
          };
          return LeadingComment {
            end_index: last_char_offset(source),
            existing: Some(existing),
          };
        };

        existing = Some(strip_comment_prefixes(drop_last_char(&source[body_start..closer])));
        index = closer + 2;
        continue;
      }

      if !c.is_whitespace() {
        break;
      }
      index += c.len_utf8();
    }

    LeadingComment {
      end_index: index,
      existing,
    }
  }
}

fn last_char_offset(source: &str) -> usize {
  source.char_indices().next_back().map_or(0, |(offset, _)| offset)
}

/// Drops the character right before the closer, normally the space of ` */`.
fn drop_last_char(text: &str) -> &str {
  text.char_indices().next_back().map_or(text, |(offset, _)| &text[..offset])
}

/// Trims the comment body and removes the ` * ` / ` *` prefix of every line.
fn strip_comment_prefixes(inner: &str) -> String {
  inner
    .trim()
    .lines()
    .map(|line| {
      let trimmed = line.trim_start();
      trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix('*'))
        .unwrap_or(line)
    })
    .collect::<Vec<_>>()
    .join("\n")
}
