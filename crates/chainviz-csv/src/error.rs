//! Error types for the chainviz-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("table has no header row")]
  MissingHeader,

  #[error("header is missing required column {0:?}")]
  MissingColumn(&'static str),

  #[error("unterminated quoted field starting on line {0}")]
  UnterminatedQuote(usize),

  #[error("line {line}: expected {expected} fields, found {found}")]
  FieldCount {
    line:     usize,
    expected: usize,
    found:    usize,
  },

  #[error("invalid integer in {column}: {value:?}")]
  InvalidInteger { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
