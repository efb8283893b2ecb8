//! Whole-corpus facts used to configure the controls: which conversations
//! exist and how long the longest chain is.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
  chain::{SpeakerHandoffs, group_chains, speaker_handoffs},
  mention::Mention,
  reference::TypeCounts,
};

/// Sorted, de-duplicated conversation ids.
pub fn conversation_ids(mentions: &[Mention]) -> Vec<u32> {
  mentions
    .iter()
    .map(|m| m.conversation_id)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Size of the largest chain; 1 for an empty corpus so a length threshold
/// always has a valid upper bound.
pub fn max_chain_length(mentions: &[Mention]) -> usize {
  group_chains(mentions)
    .iter()
    .map(|chain| chain.len())
    .max()
    .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
  pub conversations:    usize,
  pub chains:           usize,
  pub mentions:         usize,
  pub max_chain_length: usize,
  pub by_type:          TypeCounts,
  pub handoffs:         SpeakerHandoffs,
}

impl CorpusSummary {
  pub fn from_mentions(mentions: &[Mention]) -> Self {
    let chains = group_chains(mentions);
    Self {
      conversations:    conversation_ids(mentions).len(),
      chains:           chains.len(),
      mentions:         mentions.len(),
      max_chain_length: chains.iter().map(|c| c.len()).max().unwrap_or(1),
      by_type:          mentions.iter().map(|m| m.reference_type).collect(),
      handoffs:         speaker_handoffs(&chains),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reference::ReferenceType::{Nominal, Other, Pronoun};

  fn sample() -> Vec<Mention> {
    vec![
      Mention::new(4, 0, 0, "A", "a boat", Nominal),
      Mention::new(1, 0, 0, "A", "it", Pronoun),
      Mention::new(4, 0, 3, "B", "it", Pronoun),
      Mention::new(4, 0, 5, "B", "that", Other),
      Mention::new(1, 2, 1, "B", "a plan", Nominal),
    ]
  }

  #[test]
  fn conversation_ids_sorted_unique() {
    assert_eq!(conversation_ids(&sample()), [1, 4]);
    assert!(conversation_ids(&[]).is_empty());
  }

  #[test]
  fn max_chain_length_has_floor_of_one() {
    assert_eq!(max_chain_length(&sample()), 3);
    assert_eq!(max_chain_length(&[]), 1);
  }

  #[test]
  fn summary_counts() {
    let summary = CorpusSummary::from_mentions(&sample());
    assert_eq!(summary.conversations, 2);
    assert_eq!(summary.chains, 3);
    assert_eq!(summary.mentions, 5);
    assert_eq!(summary.by_type.pronoun, 2);
    assert_eq!(summary.by_type.other, 1);
    assert_eq!(summary.handoffs.cross_speaker, 1);
    assert_eq!(summary.handoffs.same_speaker, 1);
  }
}
