//! Plain-text rendering of the derived datasets.

use std::fmt::{self, Write as _};

use chainviz_core::{
  ReferenceType, TransitionState,
  chain::Chain,
  classify::EntityHint,
  corpus::CorpusSummary,
  salience::TurnSalience,
  timeline::Timeline,
  transition::{TransitionGraph, TransitionMatrix},
};

const LABEL_WIDTH: usize = 18;

/// Rendered text; writes into a `String` only fail if a `Display` impl does.
pub type Rendered = Result<String, fmt::Error>;

// ─── Timeline ─────────────────────────────────────────────────────────────────

/// Opacity shade for a decayed segment.
fn shade(opacity: f64) -> char {
  match opacity {
    o if o >= 0.75 => '█',
    o if o >= 0.50 => '▓',
    o if o >= 0.25 => '▒',
    o if o >= 0.10 => '░',
    _ => '·',
  }
}

/// Markers are drawn as their salience weight (3 = pronoun ... 0 = other).
fn marker_glyph(reference_type: ReferenceType) -> char {
  char::from(b'0' + reference_type.salience_weight())
}

fn fit_label(label: &str) -> String {
  let mut fitted: String = label.chars().take(LABEL_WIDTH - 1).collect();
  if label.chars().count() >= LABEL_WIDTH {
    fitted.pop();
    fitted.push('…');
  }
  format!("{fitted:<LABEL_WIDTH$}")
}

/// One row per chain, one column per turn, plus a salience footer.
pub fn timeline(timeline: &Timeline, salience: &[TurnSalience]) -> Rendered {
  let mut out = String::new();
  if timeline.is_empty() {
    writeln!(out, "conversation {}: no chains", timeline.conversation_id)?;
    return Ok(out);
  }

  let width = timeline.max_turn as usize + 1;
  writeln!(
    out,
    "conversation {} · {} chains · turns 0-{}",
    timeline.conversation_id,
    timeline.chains.len(),
    timeline.max_turn
  )?;

  let tens: String = (0..width)
    .map(|t| if t % 10 == 0 { char::from(b'0' + (t / 10 % 10) as u8) } else { ' ' })
    .collect();
  let ones: String = (0..width).map(|t| char::from(b'0' + (t % 10) as u8)).collect();
  writeln!(out, "{:LABEL_WIDTH$}{tens}", "")?;
  writeln!(out, "{:LABEL_WIDTH$}{ones}", "")?;

  let mut grid = vec![vec![' '; width]; timeline.chains.len()];
  for segment in &timeline.segments {
    grid[segment.display_index][segment.turn_id as usize] = shade(segment.opacity);
  }
  for marker in &timeline.markers {
    grid[marker.display_index][marker.turn_id as usize] =
      marker_glyph(marker.reference_type);
  }

  for (chain, row) in timeline.chains.iter().zip(grid) {
    writeln!(out, "{}{}", fit_label(&chain.label), row.into_iter().collect::<String>())?;
  }

  if !salience.is_empty() {
    let footer: String = salience
      .iter()
      .map(|s| match s.total {
        0 => ' ',
        n @ 1..=9 => char::from(b'0' + n as u8),
        _ => '+',
      })
      .collect();
    writeln!(out, "{:<LABEL_WIDTH$}{footer}", "salient")?;
  }

  writeln!(
    out,
    "\nmarkers: 3 pronoun, 2 nominal, 1 proper noun, 0 other; shade = decay"
  )?;
  Ok(out)
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// Matrix table with counts and percentage of the total.
pub fn matrix(matrix: &TransitionMatrix, min_chain_length: usize) -> Rendered {
  let mut out = String::new();
  let total = matrix.total();
  writeln!(
    out,
    "transitions over chains with >= {} mentions ({total} total)\n",
    min_chain_length.max(1)
  )?;

  write!(out, "{:<10}", "from \\ to")?;
  for to in TransitionState::ALL {
    write!(out, "{:>14}", to.short_label())?;
  }
  out.push('\n');

  let cells = matrix.cells();
  for (from, row) in TransitionState::PRIMARY
    .iter()
    .zip(cells.chunks(TransitionState::ALL.len()))
  {
    write!(out, "{:<10}", from.short_label())?;
    for cell in row {
      let entry = format!("{} ({:.1}%)", cell.count, cell.share * 100.0);
      write!(out, "{entry:>14}")?;
    }
    out.push('\n');
  }
  Ok(out)
}

/// Edge list; self-transitions never appear here.
pub fn graph(graph: &TransitionGraph) -> Rendered {
  let mut out = String::new();
  if graph.edges.is_empty() {
    out.push_str("no transitions\n");
    return Ok(out);
  }
  for edge in &graph.edges {
    writeln!(
      out,
      "{:>5} -> {:<5} weight {:>5}  offset {:+}",
      edge.source.code(),
      edge.target.code(),
      edge.weight,
      edge.offset
    )?;
  }
  Ok(out)
}

// ─── Corpus and chains ────────────────────────────────────────────────────────

pub fn summary(summary: &CorpusSummary, conversation_ids: &[u32]) -> Rendered {
  let mut out = String::new();
  writeln!(out, "conversations     {}", summary.conversations)?;
  writeln!(out, "chains            {}", summary.chains)?;
  writeln!(out, "mentions          {}", summary.mentions)?;
  writeln!(out, "longest chain     {}", summary.max_chain_length)?;
  for reference_type in ReferenceType::ALL {
    writeln!(
      out,
      "  {:<16}{}",
      reference_type.label(),
      summary.by_type.get(reference_type)
    )?;
  }
  writeln!(
    out,
    "handoffs          {} same speaker, {} cross speaker",
    summary.handoffs.same_speaker, summary.handoffs.cross_speaker
  )?;
  if let (Some(first), Some(last)) = (conversation_ids.first(), conversation_ids.last()) {
    writeln!(out, "conversation ids  {first}..={last}")?;
  }
  Ok(out)
}

pub fn chains(chains: &[Chain<'_>]) -> Rendered {
  let mut out = String::new();
  for chain in chains {
    write!(
      out,
      "chain {} {:?} ({} mentions)",
      chain.key.chain_id,
      chain.label(),
      chain.len()
    )?;
    match chain.entity_hint() {
      Some(EntityHint::Person) => out.push_str(" person\n"),
      Some(EntityHint::Object) => out.push_str(" object\n"),
      None => out.push('\n'),
    }
    let trace: Vec<String> = chain
      .trace()
      .iter()
      .map(|step| format!("t{} {}:{}", step.turn_id, step.speaker, step.reference_type.code()))
      .collect();
    writeln!(out, "  {}", trace.join(" → "))?;
    for transition in chain.transitions().iter().filter(|t| t.cross_speaker) {
      writeln!(
        out,
        "  handoff t{}→t{} {}→{}",
        transition.turn_start,
        transition.turn_end,
        transition.start_speaker,
        transition.end_speaker
      )?;
    }
  }
  Ok(out)
}
