//! Layered configuration: TOML file, then `CHAINVIZ_*` environment
//! variables, then command-line flags (applied by the caller).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chainviz_core::timeline::{
  DEFAULT_DECAY_RATE, DEFAULT_OPACITY_FLOOR, DEFAULT_SALIENCE_THRESHOLD,
  TimelineConfig,
};
use serde::Deserialize;

/// Runtime settings, deserialised from `chainviz.toml` and the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub data_path:          PathBuf,
  pub decay_rate:         f64,
  pub opacity_floor:      f64,
  pub salience_threshold: f64,
  pub min_chain_length:   usize,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_path:          PathBuf::from("data/coreference_chains.csv"),
      decay_rate:         DEFAULT_DECAY_RATE,
      opacity_floor:      DEFAULT_OPACITY_FLOOR,
      salience_threshold: DEFAULT_SALIENCE_THRESHOLD,
      min_chain_length:   1,
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then overlay `CHAINVIZ_*` variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("CHAINVIZ"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn timeline_config(&self) -> TimelineConfig {
    TimelineConfig {
      decay_rate:         self.decay_rate,
      opacity_floor:      self.opacity_floor,
      salience_threshold: self.salience_threshold,
    }
  }
}
