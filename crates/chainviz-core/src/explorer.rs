//! The presentation context: the loaded corpus plus the datasets derived
//! from the current control values.
//!
//! A renderer owns one [`Explorer`] and reacts to two controls: the
//! conversation selector and the chain-length threshold. Each control is a
//! pure re-invocation of the synthesizer or the aggregator.

use serde::Serialize;

use crate::{
  Result,
  corpus::{conversation_ids, max_chain_length},
  mention::Mention,
  salience::{TurnSalience, turn_salience},
  timeline::{Timeline, TimelineConfig, synthesize},
  transition::{TransitionGraph, TransitionMatrix, aggregate, to_graph},
};

/// Datasets derived from the current control values. Never stored on its
/// own; always recomputed from the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
  pub conversation_id:  u32,
  pub min_chain_length: usize,
  pub timeline:         Timeline,
  pub turn_salience:    Vec<TurnSalience>,
  pub matrix:           TransitionMatrix,
  pub graph:            TransitionGraph,
}

#[derive(Debug, Clone)]
pub struct Explorer {
  mentions: Vec<Mention>,
  config:   TimelineConfig,
  state:    ViewState,
}

impl Explorer {
  /// Build the initial view: the lowest conversation id (0 for an empty
  /// corpus) and a chain-length threshold of 1.
  pub fn new(mentions: Vec<Mention>, config: TimelineConfig) -> Result<Self> {
    config.validate()?;

    let conversation_id = conversation_ids(&mentions)
      .first()
      .copied()
      .unwrap_or_default();
    let timeline = synthesize(&mentions, conversation_id, &config);
    let turn_salience = turn_salience(&timeline, config.salience_threshold);
    let matrix = aggregate(&mentions, 1);
    let graph = to_graph(&matrix);

    Ok(Self {
      state: ViewState {
        conversation_id,
        min_chain_length: 1,
        timeline,
        turn_salience,
        matrix,
        graph,
      },
      mentions,
      config,
    })
  }

  pub fn mentions(&self) -> &[Mention] { &self.mentions }

  pub fn config(&self) -> &TimelineConfig { &self.config }

  pub fn state(&self) -> &ViewState { &self.state }

  pub fn conversation_ids(&self) -> Vec<u32> { conversation_ids(&self.mentions) }

  /// Upper bound for the chain-length control.
  pub fn max_chain_length(&self) -> usize { max_chain_length(&self.mentions) }

  /// Recompute the timeline views for `conversation_id`.
  pub fn select_conversation(&mut self, conversation_id: u32) -> &ViewState {
    tracing::debug!(conversation_id, "selecting conversation");
    let timeline = synthesize(&self.mentions, conversation_id, &self.config);
    self.state.turn_salience =
      turn_salience(&timeline, self.config.salience_threshold);
    self.state.timeline = timeline;
    self.state.conversation_id = conversation_id;
    &self.state
  }

  /// Recompute the transition views for chains of at least
  /// `min_chain_length` mentions.
  pub fn set_min_chain_length(&mut self, min_chain_length: usize) -> &ViewState {
    tracing::debug!(min_chain_length, "updating chain length threshold");
    self.state.matrix = aggregate(&self.mentions, min_chain_length);
    self.state.graph = to_graph(&self.state.matrix);
    self.state.min_chain_length = min_chain_length;
    &self.state
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    Error,
    reference::{
      ReferenceType::{Nominal, Pronoun, ProperNoun},
      TransitionState as S,
    },
  };

  fn corpus() -> Vec<Mention> {
    vec![
      Mention::new(2, 0, 0, "A", "Alice", ProperNoun),
      Mention::new(2, 0, 1, "B", "she", Pronoun),
      Mention::new(2, 0, 4, "A", "her", Pronoun),
      Mention::new(5, 1, 0, "A", "a car", Nominal),
      Mention::new(5, 1, 2, "B", "it", Pronoun),
    ]
  }

  #[test]
  fn starts_on_lowest_conversation() {
    let explorer = Explorer::new(corpus(), TimelineConfig::default()).unwrap();
    let state = explorer.state();
    assert_eq!(state.conversation_id, 2);
    assert_eq!(state.timeline.max_turn, 4);
    assert_eq!(state.turn_salience.len(), 5);
    assert_eq!(state.min_chain_length, 1);
    assert_eq!(state.matrix.get(S::Nominal, S::Pronoun), 1);
    assert_eq!(explorer.conversation_ids(), [2, 5]);
    assert_eq!(explorer.max_chain_length(), 3);
  }

  #[test]
  fn controls_recompute_only_their_views() {
    let mut explorer = Explorer::new(corpus(), TimelineConfig::default()).unwrap();
    let matrix_before = explorer.state().matrix;

    let state = explorer.select_conversation(5);
    assert_eq!(state.timeline.conversation_id, 5);
    assert_eq!(state.timeline.max_turn, 2);
    assert_eq!(state.matrix, matrix_before);

    let state = explorer.set_min_chain_length(3);
    assert_eq!(state.matrix.get(S::Nominal, S::Pronoun), 0);
    assert_eq!(state.matrix.get(S::Pronoun, S::Dissipation), 1);
    assert_eq!(state.timeline.conversation_id, 5);
  }

  #[test]
  fn empty_corpus_is_valid() {
    let explorer = Explorer::new(Vec::new(), TimelineConfig::default()).unwrap();
    let state = explorer.state();
    assert_eq!(state.conversation_id, 0);
    assert!(state.timeline.is_empty());
    assert!(state.graph.edges.is_empty());
    assert_eq!(state.graph.nodes.len(), 4);
  }

  #[test]
  fn rejects_invalid_config() {
    let config = TimelineConfig {
      decay_rate: f64::NAN,
      ..TimelineConfig::default()
    };
    let err = Explorer::new(corpus(), config).unwrap_err();
    assert!(matches!(err, Error::InvalidDecayRate(_)));
  }
}
