//! The input record: one referring expression at one turn of a dialogue.

use serde::{Deserialize, Serialize};

use crate::reference::ReferenceType;

/// A single mention of an entity. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
  pub conversation_id: u32,
  /// Unique only within `conversation_id`.
  pub chain_id:        u32,
  /// 0-based turn index within the conversation.
  pub turn_id:         u32,
  pub speaker:         String,
  /// Surface form; the first mention's text labels the chain.
  pub text:            String,
  pub reference_type:  ReferenceType,
}

impl Mention {
  pub fn new(
    conversation_id: u32,
    chain_id: u32,
    turn_id: u32,
    speaker: impl Into<String>,
    text: impl Into<String>,
    reference_type: ReferenceType,
  ) -> Self {
    Self {
      conversation_id,
      chain_id,
      turn_id,
      speaker: speaker.into(),
      text: text.into(),
      reference_type,
    }
  }

  /// The composite key identifying this mention's chain across the corpus.
  pub fn chain_key(&self) -> ChainKey {
    ChainKey {
      conversation_id: self.conversation_id,
      chain_id:        self.chain_id,
    }
  }

  pub fn salience_weight(&self) -> u8 { self.reference_type.salience_weight() }
}

/// `(conversation_id, chain_id)`. Chain ids alone are not globally unique.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChainKey {
  pub conversation_id: u32,
  pub chain_id:        u32,
}
