//! Load labeled occurrence batches into the label store.
//!
//! Each handoff file holds one JSON array of labels. Re-running a batch
//! is safe: a label lands on its `(form, doc_id, byte_offset)` slot and
//! the newest write wins.

use std::path::Path;

use anyhow::{Context, Result};
use lexd_common::config::DataPaths;
use lexd_common::db::OccurrenceStore;
use lexd_common::AnnotatedOccurrence;
use tracing::info;

use super::json_files;

pub async fn run(paths: &DataPaths, input_dir: &Path) -> Result<()> {
    let store = OccurrenceStore::open(&paths.labels_db).await?;
    let files = json_files(input_dir)?;

    let mut total = 0usize;
    for path in &files {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let batch: Vec<AnnotatedOccurrence> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;

        store.upsert_many(&batch).await?;
        info!("Ingested {} labels from {}", batch.len(), path.display());
        total += batch.len();
    }

    println!("Ingested {} labels from {} files", total, files.len());
    Ok(())
}
