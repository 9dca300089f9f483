//! Entry storage
//!
//! One row per word form. The entry itself is a JSON document in the
//! `data` column so the sense model can evolve without schema churn;
//! the `form` column exists only for keyed access and ordering.

use crate::db::retry::retry_on_busy;
use crate::db::MAX_LOCK_WAIT_MS;
use crate::model::Entry;
use crate::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;

/// Durable store of dictionary entries.
///
/// Cloning shares the underlying pool. Independent handles on the same
/// file (other processes, other tests) coordinate purely through SQLite.
#[derive(Debug, Clone)]
pub struct EntryStore {
    pool: SqlitePool,
}

impl EntryStore {
    /// Open the entry store at `db_path`, creating file and schema on
    /// first use.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = crate::db::open_pool(db_path).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, ensuring the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_entries_table(&pool).await?;
        Ok(EntryStore { pool })
    }

    /// Fetch one entry; `None` when the form is unknown.
    pub async fn get(&self, form: &str) -> Result<Option<Entry>> {
        let data: Option<String> = sqlx::query_scalar("SELECT data FROM entries WHERE form = ?")
            .bind(form)
            .fetch_optional(&self.pool)
            .await?;
        data.map(|d| decode_entry(&d)).transpose()
    }

    /// Insert or fully replace an entry.
    pub async fn put(&self, entry: &Entry) -> Result<()> {
        let data = serde_json::to_string(entry)?;
        let data = &data;
        let form = entry.form.as_str();
        let pool = &self.pool;

        retry_on_busy("entry put", MAX_LOCK_WAIT_MS, || async move {
            sqlx::query("INSERT OR REPLACE INTO entries (form, data) VALUES (?, ?)")
                .bind(form)
                .bind(data)
                .execute(pool)
                .await?;
            Ok(())
        })
        .await
    }

    /// Remove an entry. Removing an unknown form is a no-op.
    pub async fn delete(&self, form: &str) -> Result<()> {
        let pool = &self.pool;

        retry_on_busy("entry delete", MAX_LOCK_WAIT_MS, || async move {
            sqlx::query("DELETE FROM entries WHERE form = ?")
                .bind(form)
                .execute(pool)
                .await?;
            Ok(())
        })
        .await
    }

    /// All known forms, sorted.
    pub async fn all_forms(&self) -> Result<Vec<String>> {
        let forms = sqlx::query_scalar("SELECT form FROM entries ORDER BY form")
            .fetch_all(&self.pool)
            .await?;
        Ok(forms)
    }

    /// Every entry, keyed by form.
    pub async fn all_entries(&self) -> Result<HashMap<String, Entry>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT form, data FROM entries")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|(form, data)| Ok((form, decode_entry(&data)?)))
            .collect()
    }

    /// Atomically read, transform, and write back one entry.
    ///
    /// The read-compute-write runs inside a single `BEGIN IMMEDIATE`
    /// transaction: the write intent is taken before the read, so two
    /// concurrent updates of the same form serialize and neither
    /// transform is lost. The transform receives `None` when the form
    /// is absent and its return value is written unconditionally.
    ///
    /// Contended calls wait on the busy timeout and the retry budget,
    /// then surface [`crate::Error::Busy`]. The transform may run more
    /// than once if the transaction is retried, so it must be pure.
    pub async fn update<F>(&self, form: &str, transform: F) -> Result<()>
    where
        F: Fn(Option<Entry>) -> Entry,
    {
        let transform = &transform;
        let pool = &self.pool;

        retry_on_busy("entry update", MAX_LOCK_WAIT_MS, || async move {
            let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

            let data: Option<String> =
                sqlx::query_scalar("SELECT data FROM entries WHERE form = ?")
                    .bind(form)
                    .fetch_optional(&mut *tx)
                    .await?;
            let existing = data.as_deref().map(decode_entry).transpose()?;

            let updated = transform(existing);
            let encoded = serde_json::to_string(&updated)?;

            sqlx::query("INSERT OR REPLACE INTO entries (form, data) VALUES (?, ?)")
                .bind(form)
                .bind(&encoded)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(())
        })
        .await
    }
}

fn decode_entry(data: &str) -> Result<Entry> {
    Ok(serde_json::from_str(data)?)
}

async fn create_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            form TEXT PRIMARY KEY,
            data TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
