//! Write letter-bucketed YAML snapshots of the entry store.
//!
//! One file per leading letter plus a `special` bucket, each holding a
//! sorted mapping of form to entry. The buckets diff cleanly under
//! version control, which is the main way entry history gets kept.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use lexd_common::config::DataPaths;
use lexd_common::db::EntryStore;
use lexd_common::Entry;
use tracing::info;

pub async fn run(paths: &DataPaths, output_dir: &Path) -> Result<()> {
    let entries = EntryStore::open(&paths.entries_db).await?.all_entries().await?;

    let mut buckets: BTreeMap<String, BTreeMap<String, Entry>> = BTreeMap::new();
    for (form, entry) in entries {
        buckets.entry(bucket_of(&form)).or_default().insert(form, entry);
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut total = 0usize;
    for (bucket, bucket_entries) in &buckets {
        let path = output_dir.join(format!("{bucket}.yaml"));
        std::fs::write(&path, serde_yaml::to_string(bucket_entries)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {} entries to {}", bucket_entries.len(), path.display());
        total += bucket_entries.len();
    }

    println!(
        "Exported {} entries into {} bucket files under {}",
        total,
        buckets.len(),
        output_dir.display()
    );
    Ok(())
}

/// Export bucket for a form: its leading ASCII letter, else `special`.
fn bucket_of(form: &str) -> String {
    match form.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_lowercase().to_string(),
        _ => "special".to_string(),
    }
}
