//! Reference types (the grammatical category of a mention) and the states
//! of the transition graph built from them.
//!
//! Every "all types" iteration in the workspace goes through the ordered
//! constants declared here, never through map key order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── ReferenceType ───────────────────────────────────────────────────────────

/// The category of a single mention, as found in the `reference_type` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
pub enum ReferenceType {
  #[serde(rename = "P")]
  #[strum(serialize = "P")]
  Pronoun,
  #[serde(rename = "N")]
  #[strum(serialize = "N")]
  Nominal,
  #[serde(rename = "PN")]
  #[strum(serialize = "PN")]
  ProperNoun,
  /// Any code outside `P`, `N`, `PN`.
  #[serde(other)]
  Other,
}

impl ReferenceType {
  pub const ALL: [Self; 4] =
    [Self::Pronoun, Self::Nominal, Self::ProperNoun, Self::Other];

  /// Decode a wire code. Unknown codes degrade to [`ReferenceType::Other`].
  pub fn from_code(code: &str) -> Self {
    code.trim().parse().unwrap_or(Self::Other)
  }

  /// The wire code (`P`, `N`, `PN`, `Other`).
  pub fn code(self) -> &'static str { self.into() }

  /// Numeric salience carried by each mention of this type.
  pub fn salience_weight(self) -> u8 {
    match self {
      Self::Pronoun => 3,
      Self::Nominal => 2,
      Self::ProperNoun => 1,
      Self::Other => 0,
    }
  }

  /// The transition state this type feeds, or `None` for `Other`, which never
  /// takes part in transitions.
  pub fn state(self) -> Option<TransitionState> {
    match self {
      Self::Pronoun => Some(TransitionState::Pronoun),
      Self::Nominal => Some(TransitionState::Nominal),
      Self::ProperNoun => Some(TransitionState::ProperNoun),
      Self::Other => None,
    }
  }

  pub fn label(self) -> &'static str {
    self.state().map_or("Other", TransitionState::label)
  }
}

// ─── TransitionState ─────────────────────────────────────────────────────────

/// A node of the transition graph: the three primary reference types plus
/// the synthetic terminal state every chain dissipates into.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
pub enum TransitionState {
  #[serde(rename = "P")]
  #[strum(serialize = "P")]
  Pronoun,
  #[serde(rename = "N")]
  #[strum(serialize = "N")]
  Nominal,
  #[serde(rename = "PN")]
  #[strum(serialize = "PN")]
  ProperNoun,
  #[serde(rename = "End")]
  #[strum(serialize = "End")]
  Dissipation,
}

impl TransitionState {
  /// Row keys of the transition matrix.
  pub const PRIMARY: [Self; 3] = [Self::Pronoun, Self::Nominal, Self::ProperNoun];

  /// Column keys of the transition matrix and the node set of the graph.
  pub const ALL: [Self; 4] = [
    Self::Pronoun,
    Self::Nominal,
    Self::ProperNoun,
    Self::Dissipation,
  ];

  /// Position in [`TransitionState::ALL`]; primary states share the same
  /// position in [`TransitionState::PRIMARY`].
  pub fn index(self) -> usize {
    match self {
      Self::Pronoun => 0,
      Self::Nominal => 1,
      Self::ProperNoun => 2,
      Self::Dissipation => 3,
    }
  }

  pub fn is_primary(self) -> bool { self != Self::Dissipation }

  pub fn code(self) -> &'static str { self.into() }

  pub fn label(self) -> &'static str {
    match self {
      Self::Pronoun => "Pronoun (P)",
      Self::Nominal => "Nominal (N)",
      Self::ProperNoun => "Proper Noun (PN)",
      Self::Dissipation => "Dissipation",
    }
  }

  /// First word of [`TransitionState::label`]; used for graph node captions.
  pub fn short_label(self) -> &'static str {
    self.label().split(' ').next().unwrap_or_default()
  }
}

// ─── TypeCounts ──────────────────────────────────────────────────────────────

/// A per-type tally, used wherever mentions or segments are counted by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
  pub pronoun:     u32,
  pub nominal:     u32,
  pub proper_noun: u32,
  pub other:       u32,
}

impl TypeCounts {
  pub fn add(&mut self, reference_type: ReferenceType) {
    *self.slot(reference_type) += 1;
  }

  pub fn get(&self, reference_type: ReferenceType) -> u32 {
    match reference_type {
      ReferenceType::Pronoun => self.pronoun,
      ReferenceType::Nominal => self.nominal,
      ReferenceType::ProperNoun => self.proper_noun,
      ReferenceType::Other => self.other,
    }
  }

  pub fn total(&self) -> u32 {
    self.pronoun + self.nominal + self.proper_noun + self.other
  }

  fn slot(&mut self, reference_type: ReferenceType) -> &mut u32 {
    match reference_type {
      ReferenceType::Pronoun => &mut self.pronoun,
      ReferenceType::Nominal => &mut self.nominal,
      ReferenceType::ProperNoun => &mut self.proper_noun,
      ReferenceType::Other => &mut self.other,
    }
  }
}

impl FromIterator<ReferenceType> for TypeCounts {
  fn from_iter<I: IntoIterator<Item = ReferenceType>>(iter: I) -> Self {
    let mut counts = Self::default();
    for reference_type in iter {
      counts.add(reference_type);
    }
    counts
  }
}
