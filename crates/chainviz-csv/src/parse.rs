//! Mention-table parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ split_records()          → Vec<Record>
//!          └─ Columns::from_header() → column positions
//!               └─ decode_row()        → Mention, or a RejectedRow

use chainviz_core::{Mention, ReferenceType};

use crate::{
  ParsedTable, RejectedRow,
  error::{Error, Result},
};

// ─── Column names ────────────────────────────────────────────────────────────

pub(crate) const CONV_ID: &str = "conv_id";
pub(crate) const CHAIN_ID: &str = "chain_id";
pub(crate) const TURN_ID: &str = "turn_id";
pub(crate) const SPEAKER: &str = "speaker";
pub(crate) const TEXT: &str = "text";
pub(crate) const REFERENCE_TYPE: &str = "reference_type";

pub(crate) const COLUMNS: [&str; 6] =
  [CONV_ID, CHAIN_ID, TURN_ID, SPEAKER, TEXT, REFERENCE_TYPE];

// ─── Record splitting ────────────────────────────────────────────────────────

/// One logical row: its fields and the physical line it starts on (1-based).
#[derive(Debug)]
pub(crate) struct Record {
  pub(crate) line:   usize,
  pub(crate) fields: Vec<String>,
}

/// Split `input` into records, honouring double-quoted fields (with `""`
/// escapes and embedded newlines). Accepts CRLF or bare LF; blank lines are
/// dropped.
pub(crate) fn split_records(input: &str) -> Result<Vec<Record>> {
  let mut records = Vec::new();
  let mut fields: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut quoted = false;
  let mut line = 1usize;
  let mut record_line = 1usize;

  let mut chars = input.chars().peekable();
  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          chars.next();
          field.push('"');
        }
        '"' => in_quotes = false,
        '\n' => {
          line += 1;
          field.push(c);
        }
        _ => field.push(c),
      }
      continue;
    }

    match c {
      '"' if field.is_empty() && !quoted => {
        in_quotes = true;
        quoted = true;
      }
      ',' => {
        fields.push(std::mem::take(&mut field));
        quoted = false;
      }
      '\r' if chars.peek() == Some(&'\n') => {}
      '\n' => {
        fields.push(std::mem::take(&mut field));
        push_record(&mut records, record_line, std::mem::take(&mut fields), quoted);
        quoted = false;
        line += 1;
        record_line = line;
      }
      _ => field.push(c),
    }
  }

  if in_quotes {
    return Err(Error::UnterminatedQuote(record_line));
  }
  if !field.is_empty() || !fields.is_empty() || quoted {
    fields.push(field);
    push_record(&mut records, record_line, fields, quoted);
  }

  Ok(records)
}

/// `quoted` tells a quoted empty field (`""`) apart from a blank line.
fn push_record(
  records: &mut Vec<Record>,
  line: usize,
  fields: Vec<String>,
  quoted: bool,
) {
  let blank = !quoted && fields.len() == 1 && fields[0].trim().is_empty();
  if !blank {
    records.push(Record { line, fields });
  }
}

// ─── Header ──────────────────────────────────────────────────────────────────

/// Positions of the required columns within a row.
#[derive(Debug)]
pub(crate) struct Columns {
  conv_id:        usize,
  chain_id:       usize,
  turn_id:        usize,
  speaker:        usize,
  text:           usize,
  reference_type: usize,
  /// Number of fields every data row must carry.
  width:          usize,
}

impl Columns {
  /// Locate the required columns by name; order and extra columns are free.
  pub(crate) fn from_header(header: &[String]) -> Result<Self> {
    let position = |name: &'static str| {
      header
        .iter()
        .position(|h| {
          h.trim_start_matches('\u{feff}')
            .trim()
            .eq_ignore_ascii_case(name)
        })
        .ok_or(Error::MissingColumn(name))
    };

    Ok(Self {
      conv_id:        position(CONV_ID)?,
      chain_id:       position(CHAIN_ID)?,
      turn_id:        position(TURN_ID)?,
      speaker:        position(SPEAKER)?,
      text:           position(TEXT)?,
      reference_type: position(REFERENCE_TYPE)?,
      width:          header.len(),
    })
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Parse an id column. Integral floats such as `3.0` are accepted because
/// dataframe exports widen integer columns that once held a missing value.
fn parse_id(column: &'static str, value: &str) -> Result<u32> {
  let trimmed = value.trim();
  if let Ok(n) = trimmed.parse::<u32>() {
    return Ok(n);
  }
  match trimmed.parse::<f64>() {
    Ok(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => {
      Ok(f as u32)
    }
    _ => Err(Error::InvalidInteger {
      column,
      value: value.to_string(),
    }),
  }
}

pub(crate) fn decode_row(record: &Record, columns: &Columns) -> Result<Mention> {
  if record.fields.len() != columns.width {
    return Err(Error::FieldCount {
      line:     record.line,
      expected: columns.width,
      found:    record.fields.len(),
    });
  }
  let field = |i: usize| record.fields[i].as_str();

  Ok(Mention {
    conversation_id: parse_id(CONV_ID, field(columns.conv_id))?,
    chain_id:        parse_id(CHAIN_ID, field(columns.chain_id))?,
    turn_id:         parse_id(TURN_ID, field(columns.turn_id))?,
    speaker:         field(columns.speaker).to_string(),
    text:            field(columns.text).to_string(),
    reference_type:  ReferenceType::from_code(field(columns.reference_type)),
  })
}

// ─── Table ───────────────────────────────────────────────────────────────────

pub(crate) fn parse_table(input: &str) -> Result<ParsedTable> {
  let records = split_records(input)?;
  let (header, rows) = records.split_first().ok_or(Error::MissingHeader)?;
  let columns = Columns::from_header(&header.fields)?;

  let mut table = ParsedTable::default();
  for record in rows {
    match decode_row(record, &columns) {
      Ok(mention) => table.mentions.push(mention),
      Err(error) => {
        tracing::debug!(line = record.line, %error, "rejecting row");
        table.rejected.push(RejectedRow {
          line: record.line,
          error,
        });
      }
    }
  }

  tracing::debug!(
    mentions = table.mentions.len(),
    rejected = table.rejected.len(),
    "parsed mention table"
  );

  Ok(table)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields(records: &[Record]) -> Vec<Vec<&str>> {
    records
      .iter()
      .map(|r| r.fields.iter().map(String::as_str).collect())
      .collect()
  }

  // ── split_records ───────────────────────────────────────────────────────────

  #[test]
  fn plain_rows() {
    let records = split_records("a,b,c\n1,2,3\n").unwrap();
    assert_eq!(fields(&records), [vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    assert_eq!(records[1].line, 2);
  }

  #[test]
  fn crlf_and_missing_final_newline() {
    let records = split_records("a,b\r\n1,2").unwrap();
    assert_eq!(fields(&records), [vec!["a", "b"], vec!["1", "2"]]);
  }

  #[test]
  fn quoted_fields_with_commas_quotes_and_newlines() {
    let input = "id,text\n1,\"the \"\"big\"\" one, again\"\n2,\"two\nlines\"\n3,x\n";
    let records = split_records(input).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].fields[1], "the \"big\" one, again");
    assert_eq!(records[2].fields[1], "two\nlines");
    // The quoted newline pushes the next record down a line.
    assert_eq!(records[3].line, 5);
  }

  #[test]
  fn blank_lines_are_skipped() {
    let records = split_records("a\n\n1\n   \n2\n").unwrap();
    assert_eq!(fields(&records), [vec!["a"], vec!["1"], vec!["2"]]);
  }

  #[test]
  fn empty_quoted_field_is_kept() {
    let records = split_records("a\n\"\"\n").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].fields, [""]);
  }

  #[test]
  fn unterminated_quote_is_an_error() {
    let err = split_records("a,b\n1,\"oops\n").unwrap_err();
    assert!(matches!(err, Error::UnterminatedQuote(2)));
  }

  // ── header ──────────────────────────────────────────────────────────────────

  #[test]
  fn header_columns_in_any_order() {
    let header: Vec<String> = [
      "\u{feff}reference_type", "text", "extra", "speaker", "turn_id",
      "chain_id", "conv_id",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let columns = Columns::from_header(&header).unwrap();
    assert_eq!(columns.reference_type, 0);
    assert_eq!(columns.conv_id, 6);
    assert_eq!(columns.width, 7);
  }

  #[test]
  fn missing_column_is_named() {
    let header = vec!["conv_id".to_string(), "chain_id".to_string()];
    let err = Columns::from_header(&header).unwrap_err();
    assert!(matches!(err, Error::MissingColumn("turn_id")));
  }

  // ── rows ────────────────────────────────────────────────────────────────────

  #[test]
  fn integral_floats_are_accepted() {
    assert_eq!(parse_id(TURN_ID, "7").unwrap(), 7);
    assert_eq!(parse_id(TURN_ID, " 7.0 ").unwrap(), 7);
    assert!(parse_id(TURN_ID, "7.5").is_err());
    assert!(parse_id(TURN_ID, "-1").is_err());
    assert!(parse_id(TURN_ID, "NaN").is_err());
    assert!(parse_id(TURN_ID, "").is_err());
  }

  #[test]
  fn table_collects_rejected_rows() {
    let input = "conv_id,chain_id,turn_id,speaker,text,reference_type\n\
                 0,1,0,A,Alice,PN\n\
                 0,1,x,B,she,P\n\
                 0,1,2,B,her\n\
                 0,1,3,A,that one,DEM\n";
    let table = parse_table(input).unwrap();
    assert_eq!(table.mentions.len(), 2);
    assert_eq!(table.mentions[1].reference_type, ReferenceType::Other);
    assert_eq!(table.rejected.len(), 2);
    assert_eq!(table.rejected[0].line, 3);
    assert!(matches!(
      table.rejected[0].error,
      Error::InvalidInteger { column: "turn_id", .. }
    ));
    assert!(matches!(
      table.rejected[1].error,
      Error::FieldCount { line: 4, expected: 6, found: 5 }
    ));
  }

  #[test]
  fn empty_input_has_no_header() {
    assert!(matches!(parse_table(""), Err(Error::MissingHeader)));
    assert!(matches!(parse_table("\n\n"), Err(Error::MissingHeader)));
  }

  #[test]
  fn header_only_is_an_empty_table() {
    let table =
      parse_table("conv_id,chain_id,turn_id,speaker,text,reference_type\n")
        .unwrap();
    assert!(table.mentions.is_empty());
    assert!(table.rejected.is_empty());
  }
}
