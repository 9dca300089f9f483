//! Review actions on queued changes.
//!
//! Approval applies the proposal to the entry store *before* marking the
//! change approved, inside the entry store's own locked transaction. The
//! entry write lands under whatever the entry holds at review time: the
//! proposed senses replace the current list wholesale, an entry deleted
//! since proposal is recreated from the proposal, and a redirect set on
//! the entry meanwhile is kept.

use chrono::Utc;
use lexd_common::db::{ChangeStore, EntryStore};
use lexd_common::{Change, ChangeStatus, Entry, Error, Result};
use tracing::debug;
use uuid::Uuid;

/// Write a change's proposed senses into the entry store.
///
/// The change's `after` list replaces the entry's senses. Everything else
/// about the entry (currently just the redirect) survives.
pub async fn apply_change(entries: &EntryStore, change: &Change) -> Result<()> {
    let form = change.form.clone();
    let after = change.after.clone();
    entries
        .update(&change.form, move |existing| {
            let mut entry = existing.unwrap_or_else(|| Entry::new(form.as_str()));
            entry.senses = after.clone();
            entry
        })
        .await?;
    debug!("Applied change {} to entry '{}'", change.id, change.form);
    Ok(())
}

/// Approve a pending change: apply it, then mark it approved.
///
/// Returns the change in its terminal state. A change that is already
/// reviewed reports [`Error::Conflict`] without touching the entry store;
/// an unknown id reports [`Error::NotFound`].
pub async fn approve_change(
    entries: &EntryStore,
    changes: &ChangeStore,
    id: Uuid,
) -> Result<Change> {
    let change = load_pending(changes, id).await?;
    apply_change(entries, &change).await?;
    changes.set_status(id, ChangeStatus::Approved, Utc::now()).await?;
    reload(changes, id).await
}

/// Reject a pending change. The entry store is not touched.
pub async fn reject_change(changes: &ChangeStore, id: Uuid) -> Result<Change> {
    load_pending(changes, id).await?;
    changes.set_status(id, ChangeStatus::Rejected, Utc::now()).await?;
    reload(changes, id).await
}

/// Fetch a change and insist it is still pending.
///
/// This pre-check gives precise errors and keeps already-settled changes
/// away from the entry store; the guarded UPDATE in the change store is
/// still the authority if two reviewers race past it.
async fn load_pending(changes: &ChangeStore, id: Uuid) -> Result<Change> {
    let change = changes
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("change {id}")))?;
    if change.status.is_terminal() {
        return Err(Error::Conflict(format!(
            "change {} already {}",
            id,
            change.status.as_str()
        )));
    }
    Ok(change)
}

async fn reload(changes: &ChangeStore, id: Uuid) -> Result<Change> {
    changes
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("change {id}")))
}
