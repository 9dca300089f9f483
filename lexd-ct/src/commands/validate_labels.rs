//! Flag labels whose document text no longer matches.
//!
//! Prints every stale label and exits nonzero when any are found, so a
//! cron wrapper can alert. Labels whose document has left the corpus are
//! orphans, not errors, and stay quiet.

use std::path::Path;

use anyhow::{bail, Result};
use lexd_common::config::DataPaths;
use lexd_common::corpus::CorpusDb;
use lexd_common::db::OccurrenceStore;
use lexd_common::validate;
use tracing::info;

pub async fn run(paths: &DataPaths, corpus_path: &Path) -> Result<()> {
    let labels = OccurrenceStore::open(&paths.labels_db)
        .await?
        .all_rows()
        .await?;
    let docs = CorpusDb::open(corpus_path).await?.docs_map().await?;

    let stale = validate::find_stale(&labels, &docs);
    info!(
        "Checked {} labels against {} documents",
        labels.len(),
        docs.len()
    );
    println!("{} labels checked, {} stale", labels.len(), stale.len());

    if stale.is_empty() {
        return Ok(());
    }

    for label in &stale {
        println!(
            "STALE {} @ {}:{} (sense {})",
            label.form, label.doc_id, label.byte_offset, label.sense_key
        );
    }
    bail!("{} stale labels out of {}", stale.len(), labels.len());
}
