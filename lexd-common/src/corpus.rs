//! Read-only access to the ingested corpus
//!
//! The corpus database is produced by an external ingestion pipeline;
//! the curation stages only read it. Documents are full text addressed
//! by id. Occurrences are an index of where each surface form appears,
//! bucketed by a prefix column so per-form lookups stay cheap at corpus
//! scale.

use crate::model::{AnnotatedOccurrence, Occurrence, Rating};
use crate::validate::occurrence_matches;
use crate::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;

/// Bucket key for a surface form: its first ASCII letter, lowercased,
/// or `"other"` when it has none.
pub fn prefix_of(form: &str) -> String {
    form.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_else(|| "other".to_string())
}

/// Read-only handle on the corpus database.
#[derive(Debug, Clone)]
pub struct CorpusDb {
    pool: SqlitePool,
}

impl CorpusDb {
    /// Open an existing corpus database read-only. Errors when the file
    /// is missing; the curation stages never create a corpus.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = crate::db::open_pool_readonly(db_path).await?;
        Ok(CorpusDb { pool })
    }

    /// Wrap an existing pool (ingestion tooling, test fixtures).
    pub fn from_pool(pool: SqlitePool) -> Self {
        CorpusDb { pool }
    }

    /// Occurrence counts for every form in the corpus.
    pub async fn occurrence_totals(&self) -> Result<HashMap<String, u64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT form, COUNT(*) FROM occurrences GROUP BY form")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(form, n)| (form, n as u64)).collect())
    }

    /// Corpus locations of one form, via its prefix bucket.
    pub async fn occurrences_of(&self, form: &str) -> Result<Vec<Occurrence>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT doc_id, byte_offset FROM occurrences
            WHERE prefix = ? AND form = ?
            ORDER BY doc_id, byte_offset
            "#,
        )
        .bind(prefix_of(form))
        .bind(form)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(doc_id, byte_offset)| Occurrence {
                doc_id,
                byte_offset,
            })
            .collect())
    }

    /// Text of one document; `None` when the id is unknown.
    pub async fn doc_text(&self, doc_id: &str) -> Result<Option<String>> {
        let text = sqlx::query_scalar("SELECT text FROM docs WHERE doc_id = ?")
            .bind(doc_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text)
    }

    /// All document texts keyed by id. The validator compares every
    /// label against these in one pass.
    pub async fn docs_map(&self) -> Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT doc_id, text FROM docs")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

/// Create the corpus tables.
///
/// Ingestion tooling and test fixtures call this; the curation stages
/// themselves never write to the corpus.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS docs (
            doc_id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            title TEXT,
            source TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS occurrences (
            prefix TEXT NOT NULL,
            form TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            byte_offset INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_occurrences_prefix_form ON occurrences(prefix, form)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// A window of document text around one occurrence.
///
/// Returns up to `context_chars` characters on each side of the match.
/// `None` when the text at the offset no longer spells `form`; callers
/// should treat that label as stale rather than show a wrong snippet.
pub fn extract_context(
    text: &str,
    byte_offset: i64,
    form: &str,
    context_chars: usize,
) -> Option<String> {
    if !occurrence_matches(text, byte_offset, form) {
        return None;
    }
    let start = byte_offset as usize;
    let end = start + form.len();

    let window_start = text[..start]
        .char_indices()
        .rev()
        .take(context_chars)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let window_end = text[end..]
        .char_indices()
        .nth(context_chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    Some(text[window_start..window_end].to_string())
}

/// Well-rated usage snippets for a (form, sense) pair.
///
/// Walks the given labels in order, keeping those for the right sense at
/// or above `min_rating` whose document text still matches, until
/// `max_instances` snippets are collected.
pub fn fetch_instances(
    labels: &[AnnotatedOccurrence],
    docs: &HashMap<String, String>,
    form: &str,
    sense_key: &str,
    min_rating: Rating,
    context_chars: usize,
    max_instances: usize,
) -> Vec<String> {
    let mut snippets = Vec::new();
    for label in labels {
        if snippets.len() >= max_instances {
            break;
        }
        if label.form != form || label.sense_key != sense_key || label.rating < min_rating {
            continue;
        }
        let Some(text) = docs.get(&label.doc_id) else {
            continue;
        };
        if let Some(snippet) = extract_context(text, label.byte_offset, form, context_chars) {
            snippets.push(snippet);
        }
    }
    snippets
}
