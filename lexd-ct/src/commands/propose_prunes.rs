//! Queue prune changes for senses with weak label support.
//!
//! A top-level sense whose labels mostly fall short of excellent is a
//! candidate for removal, but removal is never automatic: this stage
//! only queues a pending change carrying the would-be sense list, and a
//! reviewer settles it in lexd-cr. Subsense labels, single-sense
//! entries, redirects, and forms with a prune already waiting are all
//! left alone, as is any prune that would empty the entry outright.

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use lexd_common::config::DataPaths;
use lexd_common::db::{ChangeStore, EntryStore, OccurrenceStore};
use lexd_common::model::{parse_sense_key, sense_key};
use lexd_common::{Change, ChangeKind, Sense};
use serde_json::json;
use tracing::{debug, info};

/// One weak sense: top-level index, below-excellent share, label count.
type WeakSense = (usize, f64, u64);

pub async fn run(paths: &DataPaths, min_share: f64, max_changes: usize) -> Result<()> {
    let entries = EntryStore::open(&paths.entries_db).await?;
    let labels = OccurrenceStore::open(&paths.labels_db).await?;
    let changes = ChangeStore::open(&paths.changes_db).await?;

    let pending_prunes: HashSet<String> = changes
        .all_pending()
        .await?
        .into_iter()
        .filter(|change| change.kind == ChangeKind::Prune)
        .map(|change| change.form)
        .collect();

    let mut weak: BTreeMap<String, Vec<WeakSense>> = BTreeMap::new();
    for row in labels.sense_quality().await? {
        if row.below_share() <= min_share {
            continue;
        }
        // Only whole top-level senses are pruned; subsense labels count
        // toward their parent's quality elsewhere, not here.
        let Ok((top, None)) = parse_sense_key(&row.sense_key) else {
            continue;
        };
        weak.entry(row.form.clone())
            .or_default()
            .push((top, row.below_share(), row.total));
    }

    let mut queued = 0usize;
    for (form, mut rows) in weak {
        if queued >= max_changes {
            info!("Change cap of {} reached, stopping", max_changes);
            break;
        }
        if pending_prunes.contains(&form) {
            debug!("Skipping '{}': prune already pending", form);
            continue;
        }
        let Some(entry) = entries.get(&form).await? else {
            continue;
        };
        if entry.is_redirect() || entry.senses.len() <= 1 {
            continue;
        }

        rows.sort_by_key(|row| row.0);
        // Keys can outlive a rewrite that shortened the sense list.
        let removable: Vec<WeakSense> = rows
            .into_iter()
            .filter(|(top, _, _)| *top < entry.senses.len())
            .collect();
        if removable.is_empty() {
            continue;
        }
        if removable.len() >= entry.senses.len() {
            info!("Skipping '{}': prune would remove every sense", form);
            continue;
        }

        let remove_indices: HashSet<usize> = removable.iter().map(|row| row.0).collect();
        let after: Vec<Sense> = entry
            .senses
            .iter()
            .enumerate()
            .filter(|(index, _)| !remove_indices.contains(index))
            .map(|(_, sense)| sense.clone())
            .collect();

        let removed: Vec<serde_json::Value> = removable
            .iter()
            .map(|(top, share, total)| {
                json!({
                    "sense_key": sense_key(*top, None),
                    "below_share": share,
                    "total": total,
                })
            })
            .collect();

        let change = Change::pending(
            ChangeKind::Prune,
            form.as_str(),
            entry.senses.clone(),
            after,
            Some(json!({ "removed": removed })),
        );
        changes.add(&change).await?;
        info!(
            "Queued prune for '{}' removing {} of {} senses",
            form,
            remove_indices.len(),
            entry.senses.len()
        );
        queued += 1;
    }

    println!(
        "Queued {} prune proposals (threshold {:.2})",
        queued, min_share
    );
    Ok(())
}
