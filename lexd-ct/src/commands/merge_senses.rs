//! Fold newly induced senses into the entry store.
//!
//! Reads one entry JSON file per form from the handoff directory and
//! merges each into the store: senses the entry already has (same
//! definition after trimming and lowercasing) are kept once, new ones
//! are appended, and nothing is ever dropped. The merge happens inside
//! the store's locked update so a concurrent merge of the same form
//! cannot lose senses.

use std::path::Path;

use anyhow::{Context, Result};
use lexd_common::config::DataPaths;
use lexd_common::db::EntryStore;
use lexd_common::model::merge_entry;
use lexd_common::Entry;
use tracing::info;

use super::json_files;

pub async fn run(paths: &DataPaths, input_dir: &Path) -> Result<()> {
    let entries = EntryStore::open(&paths.entries_db).await?;
    let files = json_files(input_dir)?;

    let mut merged = 0usize;
    for path in &files {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let incoming: Entry = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;

        let form = incoming.form.clone();
        let before = entries
            .get(&form)
            .await?
            .map(|entry| entry.senses.len())
            .unwrap_or(0);
        entries
            .update(&form, move |existing| match existing {
                Some(current) => merge_entry(&current, &incoming),
                None => incoming.clone(),
            })
            .await?;
        let after = entries
            .get(&form)
            .await?
            .map(|entry| entry.senses.len())
            .unwrap_or(0);

        println!("{}: {} senses appended", form, after.saturating_sub(before));
        info!("Merged senses into '{}'", form);
        merged += 1;
    }

    println!("Merged {} entry files from {}", merged, input_dir.display());
    Ok(())
}
