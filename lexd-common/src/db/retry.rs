//! Retry logic for transient database lock errors
//!
//! SQLite allows one writer per database file. Writers that lose the
//! race first wait on the connection's busy timeout; if the lock error
//! still surfaces, this layer retries with exponential backoff until a
//! total wait budget runs out, then reports [`Error::Busy`].

use crate::{Error, Result};
use std::time::{Duration, Instant};

/// Retry a database operation with exponential backoff until `max_wait_ms`
/// elapses.
///
/// Backoff starts at 10 ms and doubles up to a 1 s cap. Only lock errors
/// are retried; everything else fails immediately. The operation closure
/// may therefore run several times and must be safe to re-run.
pub async fn retry_on_busy<F, Fut, T>(
    operation_name: &str,
    max_wait_ms: u64,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let start_time = Instant::now();
    let max_duration = Duration::from_millis(max_wait_ms);
    let mut attempt = 0u32;
    let mut backoff_ms = 10u64;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Database operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_lock_error(&err) {
                    return Err(err);
                }

                let elapsed = start_time.elapsed();
                if elapsed >= max_duration {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = elapsed.as_millis() as u64,
                        max_wait_ms,
                        "Database operation failed: max retry time exceeded"
                    );
                    return Err(Error::Busy(format!(
                        "{} locked after {} attempts ({} ms elapsed, max {} ms)",
                        operation_name,
                        attempt,
                        elapsed.as_millis(),
                        max_wait_ms
                    )));
                }

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms,
                    "Database locked, will retry after backoff"
                );

                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = (backoff_ms * 2).min(1000);
            }
        }
    }
}

/// Lock errors worth retrying: SQLite's "database is locked" surfaced
/// through sqlx, or a `Busy` bubbled up from a nested operation.
fn is_lock_error(err: &Error) -> bool {
    match err {
        Error::Database(db_err) => db_err.to_string().contains("database is locked"),
        Error::Busy(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let result = retry_on_busy("test op", 5000, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn retries_lock_errors_until_success() {
        let attempts = Cell::new(0);
        let attempts_ref = &attempts;

        let result = retry_on_busy("test op", 5000, || async move {
            attempts_ref.set(attempts_ref.get() + 1);
            if attempts_ref.get() < 3 {
                Err(Error::Busy("database is locked".to_string()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget_exhausted() {
        let result: Result<()> = retry_on_busy("test op", 30, || async {
            Err(Error::Busy("database is locked".to_string()))
        })
        .await;

        assert!(matches!(result, Err(Error::Busy(_))));
    }

    #[tokio::test]
    async fn non_lock_errors_fail_immediately() {
        let attempts = Cell::new(0);
        let attempts_ref = &attempts;

        let result: Result<()> = retry_on_busy("test op", 5000, || async move {
            attempts_ref.set(attempts_ref.get() + 1);
            Err(Error::NotFound("nope".to_string()))
        })
        .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(attempts.get(), 1);
    }
}
