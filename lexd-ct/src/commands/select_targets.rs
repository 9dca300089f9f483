//! Pick the forms whose labels are most worth refreshing.
//!
//! Scores every corpus form by drawing from a binomial over its unlabeled
//! occurrences at its estimated bad-label rate, so poorly covered and
//! poorly defined forms win most of the time while long-settled forms
//! still get an occasional recheck. Writes one JSON target file per
//! selected form into the handoff directory.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use lexd_common::config::DataPaths;
use lexd_common::corpus::CorpusDb;
use lexd_common::db::{EntryStore, OccurrenceStore};
use lexd_common::model::UpdateTarget;
use lexd_common::select;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

pub async fn run(
    paths: &DataPaths,
    corpus_path: &Path,
    top_n: usize,
    output_dir: &Path,
    seed: Option<u64>,
) -> Result<()> {
    let corpus = CorpusDb::open(corpus_path).await?;
    let totals = corpus.occurrence_totals().await?;

    let labels = OccurrenceStore::open(&paths.labels_db)
        .await?
        .all_rows()
        .await?;

    let entries = EntryStore::open(&paths.entries_db).await?;
    let mut redirect_forms = HashSet::new();
    for (form, entry) in entries.all_entries().await? {
        if entry.is_redirect() {
            redirect_forms.insert(form);
        }
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let selected = select::select_top_n(&totals, &labels, &redirect_forms, top_n, &mut rng)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    for form in &selected {
        let target = UpdateTarget::for_form(form.as_str());
        // Percent-encode the form so "can't" and friends stay filesystem-safe.
        let file_name = format!("{}.json", utf8_percent_encode(form, NON_ALPHANUMERIC));
        let path = output_dir.join(file_name);
        std::fs::write(&path, serde_json::to_string_pretty(&target)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("{form}");
    }

    info!(
        "Selected {} of {} candidate forms",
        selected.len(),
        totals.len()
    );
    println!(
        "Wrote {} target files to {}",
        selected.len(),
        output_dir.display()
    );
    Ok(())
}
