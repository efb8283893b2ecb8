//! Timeline synthesis: sparse mention events → one dense row per chain.
//!
//! Every chain gets exactly one [`Segment`] per turn from its first mention
//! through the conversation's last turn. Opacity is 1.0 at a real mention and
//! decays exponentially with the number of turns since the most recent one;
//! it never compounds across mentions.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  chain::{Chain, group_chains},
  mention::Mention,
  reference::ReferenceType,
};

pub const DEFAULT_DECAY_RATE: f64 = 0.30;
pub const DEFAULT_OPACITY_FLOOR: f64 = 0.05;
pub const DEFAULT_SALIENCE_THRESHOLD: f64 = 0.65;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
  /// Exponent applied per turn since the last mention.
  pub decay_rate:         f64,
  /// Lowest opacity a segment can fade to.
  pub opacity_floor:      f64,
  /// Segments at or above this opacity count as salient in
  /// [`crate::salience::turn_salience`].
  pub salience_threshold: f64,
}

impl Default for TimelineConfig {
  fn default() -> Self {
    Self {
      decay_rate:         DEFAULT_DECAY_RATE,
      opacity_floor:      DEFAULT_OPACITY_FLOOR,
      salience_threshold: DEFAULT_SALIENCE_THRESHOLD,
    }
  }
}

impl TimelineConfig {
  pub fn validate(&self) -> Result<()> {
    if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
      return Err(Error::InvalidDecayRate(self.decay_rate));
    }
    if !(0.0..=1.0).contains(&self.opacity_floor) {
      return Err(Error::InvalidOpacityFloor(self.opacity_floor));
    }
    if !(0.0..=1.0).contains(&self.salience_threshold) {
      return Err(Error::InvalidSalienceThreshold(self.salience_threshold));
    }
    Ok(())
  }

  /// `clamp(exp(-decay_rate * turns_since), opacity_floor, 1.0)`
  pub fn decay_opacity(&self, turns_since: u32) -> f64 {
    (-self.decay_rate * f64::from(turns_since))
      .exp()
      .clamp(self.opacity_floor, 1.0)
  }
}

// ─── Output types ────────────────────────────────────────────────────────────

/// A chain's presence at a single turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
  pub chain_id:       u32,
  pub turn_id:        u32,
  /// Type of the most recent mention at or before `turn_id`.
  pub reference_type: ReferenceType,
  pub opacity:        f64,
  /// Row of the owning chain in [`Timeline::chains`].
  pub display_index:  usize,
}

/// A real mention, drawn on top of the segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
  pub turn_id:        u32,
  pub chain_id:       u32,
  pub reference_type: ReferenceType,
  pub speaker:        String,
  pub label:          String,
  pub display_index:  usize,
}

/// One row of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSummary {
  pub chain_id:      u32,
  pub first_turn:    u32,
  pub label:         String,
  pub mention_count: usize,
  pub display_index: usize,
}

/// Everything the renderer needs to draw one conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
  pub conversation_id: u32,
  /// Grouped by chain in display order, then by turn.
  pub segments:        Vec<Segment>,
  pub markers:         Vec<Marker>,
  /// Highest turn in the conversation; 0 when it has no mentions.
  pub max_turn:        u32,
  /// Chains ordered by `(first_turn, chain_id)`.
  pub chains:          Vec<ChainSummary>,
}

impl Timeline {
  pub fn is_empty(&self) -> bool { self.chains.is_empty() }

  pub fn segment(&self, chain_id: u32, turn_id: u32) -> Option<&Segment> {
    self
      .segments
      .iter()
      .find(|s| s.chain_id == chain_id && s.turn_id == turn_id)
  }

  pub fn segments_for(&self, chain_id: u32) -> impl Iterator<Item = &Segment> {
    self.segments.iter().filter(move |s| s.chain_id == chain_id)
  }
}

// ─── Synthesis ───────────────────────────────────────────────────────────────

/// Build the timeline of `conversation_id` from the full mention list.
///
/// An unknown conversation yields an empty timeline with `max_turn == 0`.
pub fn synthesize(
  mentions: &[Mention],
  conversation_id: u32,
  config: &TimelineConfig,
) -> Timeline {
  let mut chains = group_chains(
    mentions
      .iter()
      .filter(|m| m.conversation_id == conversation_id),
  );
  let max_turn = chains
    .iter()
    .flat_map(|c| c.mentions.iter().map(|m| m.turn_id))
    .max()
    .unwrap_or_default();

  chains.sort_by_key(|c| (c.first_turn(), c.key.chain_id));

  let mut timeline = Timeline {
    conversation_id,
    max_turn,
    ..Timeline::default()
  };

  for (display_index, chain) in chains.iter().enumerate() {
    timeline
      .segments
      .extend(chain_segments(chain, display_index, max_turn, config));
    timeline.markers.extend(chain.mentions.iter().map(|m| Marker {
      turn_id: m.turn_id,
      chain_id: m.chain_id,
      reference_type: m.reference_type,
      speaker: m.speaker.clone(),
      label: m.text.clone(),
      display_index,
    }));
    timeline.chains.push(ChainSummary {
      chain_id: chain.key.chain_id,
      first_turn: chain.first_turn(),
      label: chain.label(),
      mention_count: chain.len(),
      display_index,
    });
  }

  tracing::debug!(
    conversation_id,
    chains = timeline.chains.len(),
    segments = timeline.segments.len(),
    max_turn,
    "synthesized timeline"
  );

  timeline
}

/// Segments for one chain: a full-opacity segment at each mention, decayed
/// segments in the gaps, and a decayed tail up to `max_turn`.
fn chain_segments(
  chain: &Chain<'_>,
  display_index: usize,
  max_turn: u32,
  config: &TimelineConfig,
) -> Vec<Segment> {
  let segment = |turn_id: u32, anchor: &Mention, opacity: f64| Segment {
    chain_id: chain.key.chain_id,
    turn_id,
    reference_type: anchor.reference_type,
    opacity,
    display_index,
  };
  let decay_run = |anchor: &Mention, turns: RangeInclusive<u32>| {
    turns
      .map(|t| segment(t, anchor, config.decay_opacity(t - anchor.turn_id)))
      .collect::<Vec<_>>()
  };

  let mut segments = Vec::new();
  let mut previous: Option<&Mention> = None;

  for &mention in &chain.mentions {
    if let Some(prev) = previous {
      if prev.turn_id == mention.turn_id {
        // Later mention in the same turn becomes the current one.
        segments.pop();
      } else {
        segments.extend(decay_run(prev, prev.turn_id + 1..=mention.turn_id - 1));
      }
    }
    segments.push(segment(mention.turn_id, mention, 1.0));
    previous = Some(mention);
  }

  if let Some(last) = previous
    && last.turn_id < max_turn
  {
    segments.extend(decay_run(last, last.turn_id + 1..=max_turn));
  }

  segments
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reference::ReferenceType::{Nominal, Other, Pronoun, ProperNoun};

  fn m(chain: u32, turn: u32, t: ReferenceType) -> Mention {
    Mention::new(0, chain, turn, "A", format!("c{chain}t{turn}"), t)
  }

  fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

  #[test]
  fn decay_formula_matches_reference_points() {
    let cfg = TimelineConfig::default();
    assert_eq!(cfg.decay_opacity(0), 1.0);
    assert!(approx(cfg.decay_opacity(1), (-0.30f64).exp()));
    assert!((cfg.decay_opacity(1) - 0.741).abs() < 1e-3);
    assert!((cfg.decay_opacity(5) - 0.223).abs() < 1e-3);
    assert_eq!(cfg.decay_opacity(20), 0.05);
  }

  #[test]
  fn gaps_decay_from_the_previous_mention() {
    let mentions = vec![m(1, 0, ProperNoun), m(1, 3, Pronoun)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());

    assert_eq!(tl.max_turn, 3);
    let turns: Vec<_> = tl.segments.iter().map(|s| s.turn_id).collect();
    assert_eq!(turns, [0, 1, 2, 3]);

    let s1 = tl.segment(1, 1).unwrap();
    assert_eq!(s1.reference_type, ProperNoun);
    assert!(approx(s1.opacity, (-0.30f64).exp()));
    let s2 = tl.segment(1, 2).unwrap();
    assert!(approx(s2.opacity, (-0.60f64).exp()));

    let s3 = tl.segment(1, 3).unwrap();
    assert_eq!(s3.reference_type, Pronoun);
    assert_eq!(s3.opacity, 1.0);
  }

  #[test]
  fn opacity_resets_rather_than_compounds() {
    let mentions = vec![
      m(1, 0, Nominal),
      m(1, 4, Nominal),
      m(1, 5, Pronoun),
      m(2, 0, Nominal),
      m(2, 9, Nominal),
    ];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    // One turn after turn 5 looks exactly like one turn after turn 0.
    assert_eq!(tl.segment(1, 6).unwrap().opacity, tl.segment(1, 1).unwrap().opacity);
    assert_eq!(tl.segment(1, 6).unwrap().reference_type, Pronoun);
  }

  #[test]
  fn turns_at_the_top_of_the_id_range() {
    let mentions = vec![m(1, u32::MAX - 1, Nominal), m(2, u32::MAX, Pronoun)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());

    assert_eq!(tl.max_turn, u32::MAX);
    let turns: Vec<_> = tl.segments_for(1).map(|s| s.turn_id).collect();
    assert_eq!(turns, [u32::MAX - 1, u32::MAX]);
    assert!(approx(
      tl.segment(1, u32::MAX).unwrap().opacity,
      (-0.30f64).exp()
    ));
    assert_eq!(tl.segments_for(2).count(), 1);
    assert_eq!(tl.markers.len(), 2);
  }

  #[test]
  fn tail_runs_to_conversation_max_turn() {
    let mentions = vec![m(1, 2, Nominal), m(2, 0, Pronoun), m(2, 7, Pronoun)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    let turns: Vec<_> = tl.segments_for(1).map(|s| s.turn_id).collect();
    assert_eq!(turns, (2..=7).collect::<Vec<_>>());
    assert_eq!(tl.segment(1, 7).unwrap().reference_type, Nominal);
    assert!(tl.segment(1, 1).is_none());
  }

  #[test]
  fn single_mention_at_max_turn_has_no_decay() {
    let mentions = vec![m(1, 0, Nominal), m(1, 4, Nominal), m(2, 4, Other)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    let chain2: Vec<_> = tl.segments_for(2).collect();
    assert_eq!(chain2.len(), 1);
    assert_eq!(chain2[0].opacity, 1.0);
    assert_eq!(chain2[0].reference_type, Other);
    assert_eq!(tl.markers.iter().filter(|mk| mk.chain_id == 2).count(), 1);
  }

  #[test]
  fn same_turn_mentions_keep_one_segment_and_two_markers() {
    let mentions = vec![m(1, 0, Nominal), m(1, 2, Nominal), m(1, 2, Pronoun)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    let turns: Vec<_> = tl.segments.iter().map(|s| s.turn_id).collect();
    assert_eq!(turns, [0, 1, 2]);
    assert_eq!(tl.segment(1, 2).unwrap().reference_type, Pronoun);
    assert_eq!(tl.markers.len(), 3);
  }

  #[test]
  fn chain_order_breaks_ties_by_id() {
    let mentions = vec![m(10, 5, Nominal), m(3, 5, Nominal), m(7, 2, Nominal)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    let order: Vec<_> = tl.chains.iter().map(|c| (c.chain_id, c.first_turn)).collect();
    assert_eq!(order, [(7, 2), (3, 5), (10, 5)]);
    assert_eq!(tl.chains[2].display_index, 2);
    assert!(tl.segments_for(10).all(|s| s.display_index == 2));
    assert!(
      tl.markers
        .iter()
        .filter(|mk| mk.chain_id == 7)
        .all(|mk| mk.display_index == 0)
    );
  }

  #[test]
  fn unknown_conversation_is_empty() {
    let mentions = vec![m(1, 3, Nominal)];
    let tl = synthesize(&mentions, 42, &TimelineConfig::default());
    assert!(tl.is_empty());
    assert!(tl.segments.is_empty());
    assert!(tl.markers.is_empty());
    assert_eq!(tl.max_turn, 0);
    assert_eq!(tl.conversation_id, 42);
  }

  #[test]
  fn other_conversations_are_ignored() {
    let mut mentions = vec![m(1, 1, Nominal)];
    mentions.push(Mention::new(1, 1, 30, "B", "elsewhere", Pronoun));
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    assert_eq!(tl.max_turn, 1);
    assert_eq!(tl.markers.len(), 1);
  }

  #[test]
  fn validate_rejects_bad_settings() {
    let ok = TimelineConfig::default();
    assert!(ok.validate().is_ok());

    let bad = TimelineConfig { decay_rate: -0.1, ..ok };
    assert_eq!(bad.validate(), Err(Error::InvalidDecayRate(-0.1)));

    let bad = TimelineConfig { opacity_floor: 1.5, ..ok };
    assert_eq!(bad.validate(), Err(Error::InvalidOpacityFloor(1.5)));

    let bad = TimelineConfig { salience_threshold: -1.0, ..ok };
    assert_eq!(bad.validate(), Err(Error::InvalidSalienceThreshold(-1.0)));
  }

  #[test]
  fn chain_labels_come_from_first_mention() {
    let mentions = vec![m(4, 3, Pronoun), m(4, 1, ProperNoun)];
    let tl = synthesize(&mentions, 0, &TimelineConfig::default());
    assert_eq!(tl.chains[0].label, "c4t1");
    assert_eq!(tl.chains[0].mention_count, 2);
  }
}
