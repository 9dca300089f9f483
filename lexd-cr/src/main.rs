//! lexd-cr (Change Review) - Review service for queued dictionary changes
//!
//! Serves the pending change queue over HTTP so reviewers can inspect
//! rewrite and prune proposals and settle them. Approval applies the
//! proposal to the entry store; rejection leaves entries untouched.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use lexd_common::config::DataPaths;
use lexd_common::db::{ChangeStore, EntryStore};
use tracing::info;

use lexd_cr::{build_router, AppState};

/// Default port for the change review service.
const DEFAULT_PORT: u16 = 5741;

#[derive(Debug, Parser)]
#[command(name = "lexd-cr", about = "Dictionary change review service", version)]
struct Args {
    /// Data directory holding the lexd databases (overrides LEXD_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
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

    info!(
        "Starting lexd Change Review (lexd-cr) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let paths = DataPaths::resolve(args.data_dir.as_deref())?;
    paths.ensure_dir()?;
    info!("Data directory: {}", paths.data_dir.display());

    let entries = EntryStore::open(&paths.entries_db).await?;
    let changes = ChangeStore::open(&paths.changes_db).await?;
    info!("✓ Opened entry and change stores");

    let state = AppState::new(entries, changes);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Change review listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
