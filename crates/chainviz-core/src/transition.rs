//! Corpus-wide reference-type transition statistics.
//!
//! Pipeline:
//!   &[Mention]
//!     └─ group_chains()          → one chain per (conversation, chain id)
//!          └─ min-length filter  → retained chains
//!               └─ chain_tally() → one matrix per chain
//!                    └─ fold     → TransitionMatrix
//!                         └─ to_graph() → nodes + edges

use std::{collections::BTreeMap, ops::AddAssign};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
  chain::{Chain, group_chains},
  mention::Mention,
  reference::TransitionState,
};

/// Magnitude of the sideways offset given to each edge of a reciprocal pair.
pub const RECIPROCAL_OFFSET: f64 = 8.0;

// ─── Matrix ──────────────────────────────────────────────────────────────────

/// Transition counts from each primary type to every [`TransitionState`].
///
/// All twelve cells always exist, so a zero count means "no transitions"
/// rather than "not computed". The diagonal (same type repeated) is counted
/// here; [`to_graph`] leaves it out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionMatrix {
  counts: [[u32; 4]; 3],
}

/// One heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixCell {
  pub from:  TransitionState,
  pub to:    TransitionState,
  pub count: u32,
  /// `count` over the matrix total; 0 when the matrix is empty.
  pub share: f64,
}

impl TransitionMatrix {
  pub fn new() -> Self { Self::default() }

  /// Count for `from → to`. Dissipation has no outgoing row and reads as 0.
  pub fn get(&self, from: TransitionState, to: TransitionState) -> u32 {
    if from.is_primary() {
      self.counts[from.index()][to.index()]
    } else {
      0
    }
  }

  /// Overwrite one cell. Writes to the Dissipation row are ignored.
  pub fn set(&mut self, from: TransitionState, to: TransitionState, count: u32) {
    if from.is_primary() {
      self.counts[from.index()][to.index()] = count;
    }
  }

  fn increment(&mut self, from: TransitionState, to: TransitionState) {
    if from.is_primary() {
      self.counts[from.index()][to.index()] += 1;
    }
  }

  pub fn total(&self) -> u32 { self.counts.iter().flatten().sum() }

  pub fn max_count(&self) -> u32 {
    self.counts.iter().flatten().copied().max().unwrap_or_default()
  }

  /// Sum of the diagonal: same-type repetitions the graph view does not draw.
  pub fn self_transitions(&self) -> u32 {
    TransitionState::PRIMARY
      .iter()
      .map(|&state| self.get(state, state))
      .sum()
  }

  /// All twelve cells, row-major over `PRIMARY × ALL`.
  pub fn cells(&self) -> Vec<MatrixCell> {
    let total = self.total();
    TransitionState::PRIMARY
      .iter()
      .flat_map(|&from| {
        TransitionState::ALL.iter().map(move |&to| (from, to))
      })
      .map(|(from, to)| {
        let count = self.get(from, to);
        MatrixCell {
          from,
          to,
          count,
          share: if total > 0 {
            f64::from(count) / f64::from(total)
          } else {
            0.0
          },
        }
      })
      .collect()
  }
}

impl AddAssign for TransitionMatrix {
  fn add_assign(&mut self, other: Self) {
    for (row, other_row) in self.counts.iter_mut().zip(other.counts) {
      for (cell, other_cell) in row.iter_mut().zip(other_row) {
        *cell += other_cell;
      }
    }
  }
}

/// Serialised as nested maps keyed by wire code, e.g.
/// `{"P": {"P": 0, "N": 3, "PN": 1, "End": 2}, ...}`.
impl Serialize for TransitionMatrix {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    struct Row<'a>(&'a TransitionMatrix, TransitionState);

    impl Serialize for Row<'_> {
      fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TransitionState::ALL.len()))?;
        for to in TransitionState::ALL {
          map.serialize_entry(&to, &self.0.get(self.1, to))?;
        }
        map.end()
      }
    }

    let mut map = serializer.serialize_map(Some(TransitionState::PRIMARY.len()))?;
    for from in TransitionState::PRIMARY {
      map.serialize_entry(&from, &Row(self, from))?;
    }
    map.end()
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Tally reference-type transitions over every chain with at least
/// `min_chain_length` mentions.
///
/// `Other` mentions are skipped transparently: the last primary mention
/// before them stays the predecessor of the next primary one. Each retained
/// chain whose final mention is primary adds one transition into
/// Dissipation.
pub fn aggregate(mentions: &[Mention], min_chain_length: usize) -> TransitionMatrix {
  let chains = group_chains(mentions);
  let retained = chains
    .iter()
    .filter(|chain| chain.len() >= min_chain_length)
    .count();

  let matrix = chains
    .iter()
    .filter(|chain| chain.len() >= min_chain_length)
    .map(chain_tally)
    .fold(TransitionMatrix::new(), |mut acc, tally| {
      acc += tally;
      acc
    });

  tracing::debug!(
    chains = chains.len(),
    retained,
    min_chain_length,
    total = matrix.total(),
    "aggregated transitions"
  );

  matrix
}

fn chain_tally(chain: &Chain<'_>) -> TransitionMatrix {
  let mut tally = TransitionMatrix::new();

  let mut previous: Option<TransitionState> = None;
  for state in chain.mentions.iter().filter_map(|m| m.reference_type.state()) {
    if let Some(prev) = previous {
      tally.increment(prev, state);
    }
    previous = Some(state);
  }

  if let Some(last) = chain.last().and_then(|m| m.reference_type.state()) {
    tally.increment(last, TransitionState::Dissipation);
  }

  tally
}

// ─── Graph ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
  pub id:    TransitionState,
  pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
  pub source: TransitionState,
  pub target: TransitionState,
  pub weight: u32,
  /// Sideways offset separating edges that share endpoints. An edge with no
  /// counterpart gets `+RECIPROCAL_OFFSET`; the sign picks the curve side.
  pub offset: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitionGraph {
  pub nodes: Vec<GraphNode>,
  pub edges: Vec<GraphEdge>,
}

impl TransitionGraph {
  pub fn edge(
    &self,
    source: TransitionState,
    target: TransitionState,
  ) -> Option<&GraphEdge> {
    self
      .edges
      .iter()
      .find(|e| e.source == source && e.target == target)
  }
}

/// Derive the node/edge view of `matrix`.
///
/// Self-loops are dropped even when the diagonal is non-zero; see
/// [`TransitionMatrix::self_transitions`] for the count they carry.
pub fn to_graph(matrix: &TransitionMatrix) -> TransitionGraph {
  let nodes = TransitionState::ALL
    .iter()
    .map(|&id| GraphNode {
      id,
      label: id.short_label(),
    })
    .collect();

  let mut edges: Vec<GraphEdge> = TransitionState::PRIMARY
    .iter()
    .flat_map(|&source| {
      TransitionState::ALL.iter().filter_map(move |&target| {
        let weight = matrix.get(source, target);
        (source != target && weight > 0).then_some(GraphEdge {
          source,
          target,
          weight,
          offset: 0.0,
        })
      })
    })
    .collect();

  assign_offsets(&mut edges);

  TransitionGraph { nodes, edges }
}

/// Give edges sharing an unordered endpoint pair alternating offsets of
/// growing magnitude: +1, -1, +2, -2, ... times [`RECIPROCAL_OFFSET`]. A lone
/// edge is rank 0 of its group and so gets `+RECIPROCAL_OFFSET`.
fn assign_offsets(edges: &mut [GraphEdge]) {
  let mut groups: BTreeMap<(TransitionState, TransitionState), Vec<usize>> =
    BTreeMap::new();
  for (i, edge) in edges.iter().enumerate() {
    let key = if edge.source <= edge.target {
      (edge.source, edge.target)
    } else {
      (edge.target, edge.source)
    };
    groups.entry(key).or_default().push(i);
  }

  for indices in groups.values() {
    for (rank, &i) in indices.iter().enumerate() {
      let sign = if rank % 2 == 0 { 1.0 } else { -1.0 };
      let magnitude = (1 + rank / 2) as f64;
      edges[i].offset = sign * magnitude * RECIPROCAL_OFFSET;
    }
  }
}
