//! Labeled occurrence storage
//!
//! Every row records the oracle's verdict for one corpus location of a
//! form: which sense fit, and how well. `(form, doc_id, byte_offset)`
//! identifies the location, so relabeling replaces the earlier verdict.

use crate::db::retry::retry_on_busy;
use crate::db::MAX_LOCK_WAIT_MS;
use crate::model::{AnnotatedOccurrence, Rating};
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;

/// Aggregate label counts for one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormCounts {
    pub total: u64,
    /// Labels rated 2 or 3.
    pub good: u64,
    /// Labels rated 0 or 1.
    pub bad: u64,
}

/// Label quality aggregated per `(form, sense_key)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SenseQuality {
    pub form: String,
    pub sense_key: String,
    pub total: u64,
    /// Labels rated below 3.
    pub below_excellent: u64,
}

impl SenseQuality {
    /// Share of this sense's labels that fell short of excellent.
    pub fn below_share(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.below_excellent as f64 / self.total as f64
    }
}

/// Durable store of labeled occurrences.
#[derive(Debug, Clone)]
pub struct OccurrenceStore {
    pool: SqlitePool,
}

impl OccurrenceStore {
    /// Open the label store at `db_path`, creating file and schema on
    /// first use.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = crate::db::open_pool(db_path).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, ensuring the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_labels_table(&pool).await?;
        Ok(OccurrenceStore { pool })
    }

    /// Insert or replace a batch of labels in one transaction.
    ///
    /// Idempotent: re-ingesting the same batch changes nothing. Rows
    /// sharing a `(form, doc_id, byte_offset)` key take the last write.
    /// The whole batch commits or none of it does.
    pub async fn upsert_many(&self, rows: &[AnnotatedOccurrence]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let pool = &self.pool;

        retry_on_busy("label upsert", MAX_LOCK_WAIT_MS, || async move {
            let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
            for row in rows {
                sqlx::query(
                    r#"
                    INSERT OR REPLACE INTO labels (form, doc_id, byte_offset, sense_key, rating)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&row.form)
                .bind(&row.doc_id)
                .bind(row.byte_offset)
                .bind(&row.sense_key)
                .bind(i64::from(row.rating))
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    /// All labels for one form, ordered by location.
    pub async fn query_form(&self, form: &str) -> Result<Vec<AnnotatedOccurrence>> {
        let rows: Vec<LabelRow> = sqlx::query_as(
            r#"
            SELECT form, doc_id, byte_offset, sense_key, rating
            FROM labels WHERE form = ?
            ORDER BY doc_id, byte_offset
            "#,
        )
        .bind(form)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_label).collect()
    }

    /// Every label in the store, ordered by form then location.
    pub async fn all_rows(&self) -> Result<Vec<AnnotatedOccurrence>> {
        let rows: Vec<LabelRow> = sqlx::query_as(
            r#"
            SELECT form, doc_id, byte_offset, sense_key, rating
            FROM labels
            ORDER BY form, doc_id, byte_offset
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_label).collect()
    }

    /// Good/bad label counts per form, in one aggregation pass.
    pub async fn count_by_form(&self) -> Result<HashMap<String, FormCounts>> {
        let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT form,
                   COUNT(*) AS n_total,
                   SUM(CASE WHEN rating IN (2, 3) THEN 1 ELSE 0 END) AS n_good,
                   SUM(CASE WHEN rating IN (0, 1) THEN 1 ELSE 0 END) AS n_bad
            FROM labels
            GROUP BY form
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(form, total, good, bad)| {
                (
                    form,
                    FormCounts {
                        total: total as u64,
                        good: good as u64,
                        bad: bad as u64,
                    },
                )
            })
            .collect())
    }

    /// Label quality per `(form, sense_key)`: how often a sense's labels
    /// fell short of excellent. Feeds the prune proposals.
    pub async fn sense_quality(&self) -> Result<Vec<SenseQuality>> {
        let rows: Vec<(String, String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT form, sense_key,
                   COUNT(*) AS n_total,
                   SUM(CASE WHEN rating < 3 THEN 1 ELSE 0 END) AS n_below
            FROM labels
            GROUP BY form, sense_key
            ORDER BY form, sense_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(form, sense_key, total, below)| SenseQuality {
                form,
                sense_key,
                total: total as u64,
                below_excellent: below as u64,
            })
            .collect())
    }
}

type LabelRow = (String, String, i64, String, i64);

fn decode_label(row: LabelRow) -> Result<AnnotatedOccurrence> {
    let (form, doc_id, byte_offset, sense_key, rating) = row;
    let rating = Rating::try_from(rating).map_err(Error::Validation)?;
    Ok(AnnotatedOccurrence {
        form,
        doc_id,
        byte_offset,
        sense_key,
        rating,
    })
}

async fn create_labels_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS labels (
            form TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            byte_offset INTEGER NOT NULL,
            sense_key TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating IN (0, 1, 2, 3)),
            PRIMARY KEY (form, doc_id, byte_offset)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
