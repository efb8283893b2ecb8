//! `chainviz`: coreference-chain timelines and transition statistics from
//! the command line.
//!
//! # Usage
//!
//! ```
//! chainviz summary
//! chainviz timeline --conversation 12
//! chainviz transitions --min-chain-length 3 --format json
//! chainviz --data corpus.csv graph
//! ```
//!
//! Settings come from `chainviz.toml` (or `--config`), then `CHAINVIZ_*`
//! environment variables, then flags.

mod render;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chainviz_core::{
  ReferenceType,
  chain::{MentionTransition, TraceStep, group_chains},
  classify::{EntityHint, classify_reference_type},
  corpus::CorpusSummary,
  explorer::Explorer,
  salience::TurnSalience,
  timeline::Timeline,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "chainviz",
  version,
  about = "Coreference-chain timelines and transition statistics"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "chainviz.toml", global = true)]
  config: PathBuf,

  /// Mention table to load (overrides `data_path`).
  #[arg(short, long, value_name = "FILE", global = true)]
  data: Option<PathBuf>,

  /// Output format.
  #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
  format: Format,

  /// Re-derive every reference type from the mention text before analysis.
  #[arg(long, global = true)]
  reclassify: bool,

  /// Per-turn opacity decay rate (overrides `decay_rate`).
  #[arg(long, global = true)]
  decay_rate: Option<f64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Corpus-wide counts.
  Summary,

  /// Per-turn salience timeline of one conversation.
  Timeline {
    /// Conversation to draw; defaults to the lowest id in the corpus.
    #[arg(long)]
    conversation: Option<u32>,
  },

  /// Reference-type transition matrix across the corpus.
  Transitions {
    /// Ignore chains with fewer mentions (overrides `min_chain_length`).
    #[arg(short, long)]
    min_chain_length: Option<usize>,
  },

  /// Transition graph derived from the matrix.
  Graph {
    /// Ignore chains with fewer mentions (overrides `min_chain_length`).
    #[arg(short, long)]
    min_chain_length: Option<usize>,
  },

  /// Mention traces and speaker handoffs of one conversation's chains.
  Chains {
    #[arg(long)]
    conversation: u32,
  },

  /// Classify free-text mentions by surface form.
  Classify {
    #[arg(required = true)]
    text: Vec<String>,
  },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
  Text,
  Json,
}

// ─── JSON payloads ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SummaryOutput<'a> {
  summary:          &'a CorpusSummary,
  conversation_ids: &'a [u32],
}

#[derive(Serialize)]
struct TimelineOutput<'a> {
  timeline:      &'a Timeline,
  turn_salience: &'a [TurnSalience],
}

#[derive(Serialize)]
struct ChainOutput {
  chain_id:    u32,
  label:       String,
  entity:      Option<EntityHint>,
  trace:       Vec<TraceStep>,
  transitions: Vec<MentionTransition>,
}

#[derive(Serialize)]
struct ClassifiedText<'a> {
  text:           &'a str,
  reference_type: ReferenceType,
}

fn emit<T: Serialize>(
  format: Format,
  value: &T,
  text: impl FnOnce() -> render::Rendered,
) -> anyhow::Result<()> {
  match format {
    Format::Json => {
      let json =
        serde_json::to_string_pretty(value).context("failed to encode output")?;
      println!("{json}");
    }
    Format::Text => print!("{}", text().context("failed to render output")?),
  }
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command {
    // Classification needs no corpus.
    Command::Classify { text } => classify(cli.format, &text),
    command => {
      // CLI flags override environment, which overrides the config file.
      let mut settings = Settings::load(&cli.config)?;
      if let Some(data) = cli.data {
        settings.data_path = data;
      }
      if let Some(decay_rate) = cli.decay_rate {
        settings.decay_rate = decay_rate;
      }

      let mut mentions = chainviz_csv::load_or_empty(&settings.data_path);
      if cli.reclassify {
        mentions = chainviz_csv::reclassify(mentions);
      }

      let mut explorer = Explorer::new(mentions, settings.timeline_config())
        .context("invalid timeline settings")?;
      run(command, &mut explorer, &settings, cli.format)
    }
  }
}

fn run(
  command: Command,
  explorer: &mut Explorer,
  settings: &Settings,
  format: Format,
) -> anyhow::Result<()> {
  match command {
    Command::Summary => {
      let summary = CorpusSummary::from_mentions(explorer.mentions());
      let ids = explorer.conversation_ids();
      let output = SummaryOutput {
        summary:          &summary,
        conversation_ids: &ids,
      };
      emit(format, &output, || render::summary(&summary, &ids))
    }

    Command::Timeline { conversation } => {
      let state = match conversation {
        Some(id) => explorer.select_conversation(id),
        None => explorer.state(),
      };
      if state.timeline.is_empty() {
        tracing::warn!(
          conversation_id = state.conversation_id,
          "conversation has no chains"
        );
      }
      let output = TimelineOutput {
        timeline:      &state.timeline,
        turn_salience: &state.turn_salience,
      };
      emit(format, &output, || {
        render::timeline(&state.timeline, &state.turn_salience)
      })
    }

    Command::Transitions { min_chain_length } => {
      let min = min_chain_length.unwrap_or(settings.min_chain_length);
      warn_if_unreachable(explorer, min);
      let state = explorer.set_min_chain_length(min);
      emit(format, &state.matrix, || render::matrix(&state.matrix, min))
    }

    Command::Graph { min_chain_length } => {
      let min = min_chain_length.unwrap_or(settings.min_chain_length);
      warn_if_unreachable(explorer, min);
      let state = explorer.set_min_chain_length(min);
      emit(format, &state.graph, || render::graph(&state.graph))
    }

    Command::Chains { conversation } => {
      let chains = group_chains(
        explorer
          .mentions()
          .iter()
          .filter(|m| m.conversation_id == conversation),
      );
      if chains.is_empty() {
        tracing::warn!(conversation_id = conversation, "conversation has no chains");
      }
      let output: Vec<_> = chains
        .iter()
        .map(|c| ChainOutput {
          chain_id:    c.key.chain_id,
          label:       c.label(),
          entity:      c.entity_hint(),
          trace:       c.trace(),
          transitions: c.transitions(),
        })
        .collect();
      emit(format, &output, || render::chains(&chains))
    }

    Command::Classify { text } => classify(format, &text),
  }
}

fn classify(format: Format, text: &[String]) -> anyhow::Result<()> {
  let classified: Vec<_> = text
    .iter()
    .map(|t| ClassifiedText {
      text:           t,
      reference_type: classify_reference_type(t),
    })
    .collect();
  emit(format, &classified, || {
    Ok(
      classified
        .iter()
        .map(|c| format!("{}\t{}\n", c.reference_type.code(), c.text))
        .collect(),
    )
  })
}

fn warn_if_unreachable(explorer: &Explorer, min_chain_length: usize) {
  let longest = explorer.max_chain_length();
  if min_chain_length > longest {
    tracing::warn!(
      min_chain_length,
      longest,
      "no chain is long enough; all counts will be zero"
    );
  }
}
