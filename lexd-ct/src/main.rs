//! lexd-ct (Curation Tools) - Batch stages of the dictionary pipeline
//!
//! Each subcommand is one pipeline stage. Stages exchange work through
//! JSON handoff directories and the shared lexd stores, so they can run
//! independently and repeatedly without stepping on each other.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lexd_common::config::DataPaths;

use lexd_ct::commands;

/// Command-line arguments for lexd-ct
#[derive(Parser, Debug)]
#[command(name = "lexd-ct")]
#[command(about = "Curation pipeline tools for the lexd dictionary")]
#[command(version)]
struct Cli {
    /// Data directory holding the lexd databases (overrides LEXD_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick the forms whose labels are most worth refreshing
    SelectTargets {
        /// Corpus database to draw occurrence counts from
        #[arg(long)]
        corpus: PathBuf,

        /// How many forms to select
        #[arg(long, default_value = "100")]
        top_n: usize,

        /// Directory to write one target file per selected form
        #[arg(long)]
        output_dir: PathBuf,

        /// Fixed RNG seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Report labels whose document text no longer matches
    ValidateLabels {
        /// Corpus database holding the document texts
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Clear leftover senses from entries that redirect elsewhere
    RepairRedirects,

    /// Fold induced-sense entry files into the entry store
    MergeSenses {
        /// Directory of per-form entry JSON files
        input_dir: PathBuf,
    },

    /// Load labeled occurrence batches into the label store
    IngestLabels {
        /// Directory of label batch JSON files
        input_dir: PathBuf,
    },

    /// List case-variant entry pairs that could become redirects
    RedirectCandidates,

    /// Queue prune changes for senses with weak label support
    ProposePrunes {
        /// Minimum share of below-excellent labels before a sense is pruned
        #[arg(long, default_value = "0.2")]
        min_share: f64,

        /// Cap on queued changes per run
        #[arg(long, default_value = "50")]
        max_changes: usize,
    },

    /// Write letter-bucketed YAML snapshots of the entry store
    Export {
        /// Directory to write the bucket files into
        output_dir: PathBuf,
    },

    /// Show well-rated usage snippets for one sense
    Instances {
        /// Corpus database holding the document texts
        #[arg(long)]
        corpus: PathBuf,

        /// Dictionary form to look up
        form: String,

        /// Sense key within the form, e.g. "2" or "3b"
        sense_key: String,

        /// Lowest rating still shown (0-3)
        #[arg(long, default_value = "2")]
        min_rating: i64,

        /// Maximum number of snippets
        #[arg(long, default_value = "10")]
        max: usize,

        /// Characters of context on each side of the occurrence
        #[arg(long, default_value = "80")]
        context: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let paths = DataPaths::resolve(cli.data_dir.as_deref())?;
    paths.ensure_dir()?;

    match cli.command {
        Command::SelectTargets {
            corpus,
            top_n,
            output_dir,
            seed,
        } => commands::select_targets::run(&paths, &corpus, top_n, &output_dir, seed).await,
        Command::ValidateLabels { corpus } => {
            commands::validate_labels::run(&paths, &corpus).await
        }
        Command::RepairRedirects => commands::repair_redirects::run(&paths).await,
        Command::MergeSenses { input_dir } => {
            commands::merge_senses::run(&paths, &input_dir).await
        }
        Command::IngestLabels { input_dir } => {
            commands::ingest_labels::run(&paths, &input_dir).await
        }
        Command::RedirectCandidates => commands::redirect_candidates::run(&paths).await,
        Command::ProposePrunes {
            min_share,
            max_changes,
        } => commands::propose_prunes::run(&paths, min_share, max_changes).await,
        Command::Export { output_dir } => commands::export::run(&paths, &output_dir).await,
        Command::Instances {
            corpus,
            form,
            sense_key,
            min_rating,
            max,
            context,
        } => {
            commands::instances::run(&paths, &corpus, &form, &sense_key, min_rating, max, context)
                .await
        }
    }
}
