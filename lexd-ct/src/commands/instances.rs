//! Show well-rated usage snippets for one sense.
//!
//! Pulls the form's labels, keeps those for the requested sense at or
//! above the rating floor, and prints a context window around each
//! occurrence that still matches its document text.

use std::path::Path;

use anyhow::{anyhow, Result};
use lexd_common::config::DataPaths;
use lexd_common::corpus::{fetch_instances, CorpusDb};
use lexd_common::db::OccurrenceStore;
use lexd_common::model::parse_sense_key;
use lexd_common::Rating;

pub async fn run(
    paths: &DataPaths,
    corpus_path: &Path,
    form: &str,
    sense_key: &str,
    min_rating: i64,
    max_instances: usize,
    context_chars: usize,
) -> Result<()> {
    let min_rating = Rating::try_from(min_rating).map_err(|e| anyhow!(e))?;
    // Fail on a bad key up front instead of silently matching nothing.
    parse_sense_key(sense_key)?;

    let labels = OccurrenceStore::open(&paths.labels_db)
        .await?
        .query_form(form)
        .await?;
    let docs = CorpusDb::open(corpus_path).await?.docs_map().await?;

    let snippets = fetch_instances(
        &labels,
        &docs,
        form,
        sense_key,
        min_rating,
        context_chars,
        max_instances,
    );

    if snippets.is_empty() {
        println!("No usable instances for '{}' sense {}", form, sense_key);
        return Ok(());
    }
    for (index, snippet) in snippets.iter().enumerate() {
        println!("{:>2}. {}", index + 1, snippet);
    }
    Ok(())
}
