//! Pipeline stage implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod export;
pub mod ingest_labels;
pub mod instances;
pub mod merge_senses;
pub mod propose_prunes;
pub mod redirect_candidates;
pub mod repair_redirects;
pub mod select_targets;
pub mod validate_labels;

/// JSON files in a handoff directory, sorted by name so every run walks
/// them in the same order.
pub(crate) fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|res| res.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}
