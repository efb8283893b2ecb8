//! Chains: every mention of one entity within one conversation, in turn
//! order. Chains are derived on each query and borrow from the input list.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  classify::{EntityHint, entity_hint},
  mention::{ChainKey, Mention},
  reference::ReferenceType,
};

/// The turn-ordered mentions sharing a [`ChainKey`]. Never empty.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
  pub key:      ChainKey,
  pub mentions: Vec<&'a Mention>,
}

/// Group `mentions` by `(conversation_id, chain_id)`.
///
/// Each chain is stably sorted by turn, so mentions sharing a turn keep their
/// input order. Chains come back ordered by key.
pub fn group_chains<'a, I>(mentions: I) -> Vec<Chain<'a>>
where
  I: IntoIterator<Item = &'a Mention>,
{
  let mut groups: BTreeMap<ChainKey, Vec<&'a Mention>> = BTreeMap::new();
  for mention in mentions {
    groups.entry(mention.chain_key()).or_default().push(mention);
  }

  groups
    .into_iter()
    .map(|(key, mut mentions)| {
      mentions.sort_by_key(|m| m.turn_id);
      Chain { key, mentions }
    })
    .collect()
}

// ─── Chain ───────────────────────────────────────────────────────────────────

/// One step of a chain's adaptation trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
  pub turn_id:        u32,
  pub reference_type: ReferenceType,
  pub speaker:        String,
}

/// Two temporally adjacent mentions of the same chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionTransition {
  pub conversation_id: u32,
  pub chain_id:        u32,
  pub turn_start:      u32,
  pub turn_end:        u32,
  pub start_type:      ReferenceType,
  pub end_type:        ReferenceType,
  pub start_speaker:   String,
  pub end_speaker:     String,
  pub cross_speaker:   bool,
}

impl<'a> Chain<'a> {
  pub fn len(&self) -> usize { self.mentions.len() }

  pub fn is_empty(&self) -> bool { self.mentions.is_empty() }

  pub fn first(&self) -> Option<&'a Mention> { self.mentions.first().copied() }

  pub fn last(&self) -> Option<&'a Mention> { self.mentions.last().copied() }

  /// Turn of the earliest mention; 0 for an empty chain.
  pub fn first_turn(&self) -> u32 {
    self.first().map(|m| m.turn_id).unwrap_or_default()
  }

  /// The first mention's text, or `Chain <id>` when it is blank.
  pub fn label(&self) -> String {
    match self.first() {
      Some(m) if !m.text.trim().is_empty() => m.text.clone(),
      _ => format!("Chain {}", self.key.chain_id),
    }
  }

  /// Hint from the chain's first mention that is a personal pronoun.
  pub fn entity_hint(&self) -> Option<EntityHint> {
    self.mentions.iter().find_map(|m| entity_hint(&m.text))
  }

  pub fn trace(&self) -> Vec<TraceStep> {
    self
      .mentions
      .iter()
      .map(|m| TraceStep {
        turn_id:        m.turn_id,
        reference_type: m.reference_type,
        speaker:        m.speaker.clone(),
      })
      .collect()
  }

  /// Every adjacent pair of mentions, `Other` types included.
  pub fn transitions(&self) -> Vec<MentionTransition> {
    self
      .mentions
      .windows(2)
      .map(|pair| {
        let (from, to) = (pair[0], pair[1]);
        MentionTransition {
          conversation_id: self.key.conversation_id,
          chain_id:        self.key.chain_id,
          turn_start:      from.turn_id,
          turn_end:        to.turn_id,
          start_type:      from.reference_type,
          end_type:        to.reference_type,
          start_speaker:   from.speaker.clone(),
          end_speaker:     to.speaker.clone(),
          cross_speaker:   from.speaker != to.speaker,
        }
      })
      .collect()
  }
}

// ─── Speaker hand-offs ───────────────────────────────────────────────────────

/// How often a chain continues with the same speaker versus the other one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpeakerHandoffs {
  pub same_speaker:  u32,
  pub cross_speaker: u32,
}

pub fn speaker_handoffs(chains: &[Chain<'_>]) -> SpeakerHandoffs {
  chains
    .iter()
    .flat_map(|chain| chain.mentions.windows(2))
    .fold(SpeakerHandoffs::default(), |mut acc, pair| {
      if pair[0].speaker == pair[1].speaker {
        acc.same_speaker += 1;
      } else {
        acc.cross_speaker += 1;
      }
      acc
    })
}
