//! Per-turn salience counts: how many chains are still "live" at each turn.

use serde::Serialize;

use crate::{reference::TypeCounts, timeline::Timeline};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSalience {
  pub turn_id: u32,
  #[serde(flatten)]
  pub counts:  TypeCounts,
  pub total:   u32,
}

/// For every turn of `timeline`, count segments with opacity at or above
/// `threshold`, bucketed by reference type. Empty for an empty timeline.
pub fn turn_salience(timeline: &Timeline, threshold: f64) -> Vec<TurnSalience> {
  if timeline.is_empty() {
    return Vec::new();
  }

  let mut per_turn = vec![TypeCounts::default(); timeline.max_turn as usize + 1];
  for segment in timeline.segments.iter().filter(|s| s.opacity >= threshold) {
    per_turn[segment.turn_id as usize].add(segment.reference_type);
  }

  per_turn
    .into_iter()
    .zip(0..)
    .map(|(counts, turn_id)| TurnSalience {
      turn_id,
      total: counts.total(),
      counts,
    })
    .collect()
}
