//! Change queue storage
//!
//! Proposed edits wait here for review. A change is reviewed exactly
//! once: the status column moves from `pending` to `approved` or
//! `rejected` under a guarded UPDATE, so a double review races to a
//! conflict instead of recording two outcomes.

use crate::db::retry::retry_on_busy;
use crate::db::MAX_LOCK_WAIT_MS;
use crate::model::{Change, ChangeKind, ChangeStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Durable queue of proposed entry changes.
#[derive(Debug, Clone)]
pub struct ChangeStore {
    pool: SqlitePool,
}

impl ChangeStore {
    /// Open the change store at `db_path`, creating file and schema on
    /// first use.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = crate::db::open_pool(db_path).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, ensuring the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_changes_table(&pool).await?;
        Ok(ChangeStore { pool })
    }

    /// Queue a new change.
    pub async fn add(&self, change: &Change) -> Result<()> {
        let id = change.id.to_string();
        let before = serde_json::to_string(&change.before)?;
        let after = serde_json::to_string(&change.after)?;
        let extra = change
            .extra
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let created_at = change.created_at.to_rfc3339();
        let reviewed_at = change.reviewed_at.map(|t| t.to_rfc3339());

        // Shared references only, so the retry closure can re-run
        let id = &id;
        let before = &before;
        let after = &after;
        let extra = &extra;
        let created_at = &created_at;
        let reviewed_at = &reviewed_at;
        let form = change.form.as_str();
        let pool = &self.pool;
        let (kind, status) = (change.kind, change.status);

        retry_on_busy("change add", MAX_LOCK_WAIT_MS, || async move {
            sqlx::query(
                r#"
                INSERT INTO changes (id, kind, form, before_senses, after_senses,
                                     extra, status, created_at, reviewed_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(kind.as_str())
            .bind(form)
            .bind(before)
            .bind(after)
            .bind(extra)
            .bind(status.as_str())
            .bind(created_at)
            .bind(reviewed_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await
    }

    /// Fetch one change in any status; `None` when the id is unknown.
    pub async fn get(&self, id: Uuid) -> Result<Option<Change>> {
        let row: Option<ChangeRow> = sqlx::query_as(
            r#"
            SELECT id, kind, form, before_senses, after_senses,
                   extra, status, created_at, reviewed_at
            FROM changes WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(decode_change).transpose()
    }

    /// All pending changes, oldest first.
    pub async fn all_pending(&self) -> Result<Vec<Change>> {
        let rows: Vec<ChangeRow> = sqlx::query_as(
            r#"
            SELECT id, kind, form, before_senses, after_senses,
                   extra, status, created_at, reviewed_at
            FROM changes WHERE status = 'pending'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_change).collect()
    }

    /// Move a pending change to a terminal status, recording when.
    ///
    /// Guarded on the current status: once a change is approved or
    /// rejected, further transitions report [`Error::Conflict`] and an
    /// unknown id reports [`Error::NotFound`].
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ChangeStatus,
        reviewed_at: DateTime<Utc>,
    ) -> Result<()> {
        if !status.is_terminal() {
            return Err(Error::Validation(format!(
                "cannot move change {} back to {}",
                id,
                status.as_str()
            )));
        }

        let id_str = id.to_string();
        let reviewed_at = reviewed_at.to_rfc3339();
        let id_str = &id_str;
        let reviewed_at = &reviewed_at;
        let pool = &self.pool;

        retry_on_busy("change review", MAX_LOCK_WAIT_MS, || async move {
            let affected = sqlx::query(
                "UPDATE changes SET status = ?, reviewed_at = ? WHERE id = ? AND status = 'pending'",
            )
            .bind(status.as_str())
            .bind(reviewed_at)
            .bind(id_str)
            .execute(pool)
            .await?
            .rows_affected();

            if affected == 0 {
                // Unknown id, or the guard lost to an earlier review
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM changes WHERE id = ?)")
                        .bind(id_str)
                        .fetch_one(pool)
                        .await?;
                if exists {
                    return Err(Error::Conflict(format!("change {} already reviewed", id)));
                }
                return Err(Error::NotFound(format!("change {}", id)));
            }

            Ok(())
        })
        .await
    }
}

type ChangeRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
);

fn decode_change(row: ChangeRow) -> Result<Change> {
    let (id, kind, form, before, after, extra, status, created_at, reviewed_at) = row;

    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Validation(format!("corrupt change id {}: {}", id, e)))?;
    let kind = ChangeKind::from_str(&kind)?;
    let status = ChangeStatus::from_str(&status)?;
    let before = serde_json::from_str(&before)?;
    let after = serde_json::from_str(&after)?;
    let extra = extra.as_deref().map(serde_json::from_str).transpose()?;
    let created_at = parse_timestamp(&created_at)?;
    let reviewed_at = reviewed_at.as_deref().map(parse_timestamp).transpose()?;

    Ok(Change {
        id,
        kind,
        form,
        before,
        after,
        extra,
        status,
        created_at,
        reviewed_at,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| Error::Validation(format!("invalid timestamp {}: {}", raw, e)))?
        .with_timezone(&Utc))
}

async fn create_changes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS changes (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('rewrite', 'pos_tag', 'prune')),
            form TEXT NOT NULL,
            before_senses TEXT NOT NULL,
            after_senses TEXT NOT NULL,
            extra TEXT,
            status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
            created_at TEXT NOT NULL,
            reviewed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_changes_status_created ON changes(status, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
