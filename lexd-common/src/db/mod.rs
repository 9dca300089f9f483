//! SQLite access layer
//!
//! Each store owns one database file. Several processes may hold handles
//! on the same file at once; WAL mode keeps readers unblocked while the
//! single writer works, and the busy timeout plus [`retry`] bound how
//! long a contended writer waits before surfacing [`crate::Error::Busy`].

pub mod changes;
pub mod entries;
pub mod occurrences;
pub mod retry;

pub use changes::ChangeStore;
pub use entries::EntryStore;
pub use occurrences::{FormCounts, OccurrenceStore, SenseQuality};

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Per-connection wait for SQLite's write lock before "database is
/// locked" surfaces and the retry layer takes over.
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Total budget the retry layer spends on one contended write.
pub const MAX_LOCK_WAIT_MS: u64 = 5000;

/// Open a database file for read-write access, creating it (and its
/// parent directory) on first use.
pub async fn open_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Options are applied per pooled connection, so every connection
    // gets WAL, the busy timeout, and foreign key enforcement.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Open an existing database file read-only.
///
/// Fails fast with a clear message when the file is missing rather than
/// leaving an empty database behind.
pub async fn open_pool_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(crate::Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("database not found: {}", db_path.display()),
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    info!("Opened database read-only: {}", db_path.display());

    Ok(pool)
}
