//! Error types for `chainviz-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("decay rate must be finite and non-negative, got {0}")]
  InvalidDecayRate(f64),

  #[error("opacity floor must lie in [0, 1], got {0}")]
  InvalidOpacityFloor(f64),

  #[error("salience threshold must lie in [0, 1], got {0}")]
  InvalidSalienceThreshold(f64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
