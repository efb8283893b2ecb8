//! Tabular codec for coreference mention records.
//!
//! Reads and writes the header-first, comma-separated table with columns
//! `conv_id, chain_id, turn_id, speaker, text, reference_type`. Pure
//! synchronous; the only I/O is in [`load`] and [`load_or_empty`].
//!
//! # Quick start
//!
//! ```no_run
//! use chainviz_csv::parse;
//!
//! let table = "conv_id,chain_id,turn_id,speaker,text,reference_type\n\
//!              0,0,0,A,Alice,PN\n";
//! let parsed = parse(table).unwrap();
//! println!("{} mentions, {} rejected", parsed.mentions.len(), parsed.rejected.len());
//! ```

pub mod error;
mod parse;
mod serialize;

use std::path::Path;

use chainviz_core::{Mention, classify::classify_reference_type};
pub use error::{Error, Result};

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// A row that could not be decoded. Rejected rows never abort a parse.
#[derive(Debug)]
pub struct RejectedRow {
  /// 1-based line the row starts on.
  pub line:  usize,
  pub error: Error,
}

/// The result of parsing a table.
#[derive(Debug, Default)]
pub struct ParsedTable {
  /// Rows decoded successfully, in input order.
  pub mentions: Vec<Mention>,
  pub rejected: Vec<RejectedRow>,
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Parse a mention table from `input`.
///
/// Fails only when the table as a whole is unusable: no header, a required
/// column missing, or an unterminated quote. Bad rows land in
/// [`ParsedTable::rejected`]; unknown reference types decode as `Other`.
pub fn parse(input: &str) -> Result<ParsedTable> { parse::parse_table(input) }

/// Serialize `mentions` as a table (LF line endings, header first).
pub fn serialize(mentions: &[Mention]) -> String {
  serialize::serialize(mentions)
}

/// Read and parse the table at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<ParsedTable> {
  let raw = std::fs::read_to_string(path.as_ref())?;
  parse(&raw)
}

/// Read the table at `path`, falling back to an empty list on any failure.
///
/// Downstream analytics treat the empty list as a valid, empty corpus.
pub fn load_or_empty(path: impl AsRef<Path>) -> Vec<Mention> {
  let path = path.as_ref();
  match load(path) {
    Ok(table) => {
      if !table.rejected.is_empty() {
        tracing::warn!(
          path = %path.display(),
          rejected = table.rejected.len(),
          "skipped malformed rows"
        );
      }
      tracing::info!(
        path = %path.display(),
        mentions = table.mentions.len(),
        "loaded mention table"
      );
      table.mentions
    }
    Err(error) => {
      tracing::warn!(
        path = %path.display(),
        %error,
        "failed to load mention table; continuing with no data"
      );
      Vec::new()
    }
  }
}

/// Replace every mention's reference type with the surface-form heuristic's
/// verdict on its text.
pub fn reclassify(mentions: Vec<Mention>) -> Vec<Mention> {
  mentions
    .into_iter()
    .map(|mut m| {
      m.reference_type = classify_reference_type(&m.text);
      m
    })
    .collect()
}

// ─── Round-trip and file tests ───────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::io::Write;

  use chainviz_core::ReferenceType;

  use super::*;

  fn sample() -> Vec<Mention> {
    vec![
      Mention::new(0, 3, 0, "A", "Mr. Smith, Jr.", ReferenceType::ProperNoun),
      Mention::new(0, 3, 4, "B", "he said \"no\"", ReferenceType::Pronoun),
      Mention::new(7, 1, 2, "A", "the\nthing", ReferenceType::Nominal),
      Mention::new(7, 1, 9, "B", "", ReferenceType::Other),
    ]
  }

  #[test]
  fn round_trip() {
    let mentions = sample();
    let parsed = parse(&serialize(&mentions)).unwrap();
    assert!(parsed.rejected.is_empty());
    assert_eq!(parsed.mentions, mentions);
  }

  #[test]
  fn load_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serialize(&sample()).as_bytes()).unwrap();
    let table = load(file.path()).unwrap();
    assert_eq!(table.mentions.len(), 4);
  }

  #[test]
  fn load_or_empty_swallows_failures() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_or_empty(dir.path().join("missing.csv")).is_empty());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not,a,mention,table\n1,2,3,4\n").unwrap();
    assert!(load_or_empty(file.path()).is_empty());
  }

  #[test]
  fn load_error_is_io() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
  }

  #[test]
  fn reclassify_uses_text() {
    let mentions = vec![
      Mention::new(0, 0, 0, "A", "Dallas", ReferenceType::Other),
      Mention::new(0, 0, 1, "B", "it", ReferenceType::Nominal),
      Mention::new(0, 0, 2, "A", "the city", ReferenceType::Pronoun),
    ];
    let types: Vec<_> = reclassify(mentions)
      .iter()
      .map(|m| m.reference_type)
      .collect();
    assert_eq!(
      types,
      [
        ReferenceType::ProperNoun,
        ReferenceType::Pronoun,
        ReferenceType::Nominal
      ]
    );
  }
}
