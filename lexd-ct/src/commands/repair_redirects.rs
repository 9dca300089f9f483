//! Clear leftover senses from entries that redirect elsewhere.
//!
//! A redirect entry should carry no senses of its own; senses linger when
//! an entry is turned into a redirect after definitions were merged in.
//! Each repair runs through the entry store's locked update, so a racing
//! writer cannot resurrect the cleared senses mid-repair.

use anyhow::Result;
use lexd_common::config::DataPaths;
use lexd_common::db::EntryStore;
use lexd_common::Entry;

pub async fn run(paths: &DataPaths) -> Result<()> {
    let entries = EntryStore::open(&paths.entries_db).await?;
    let all = entries.all_entries().await?;

    let mut forms: Vec<&String> = all.keys().collect();
    forms.sort();

    let mut repaired = 0usize;
    for form in forms {
        let entry = &all[form];
        let Some(target) = entry.redirect.clone() else {
            continue;
        };
        if entry.senses.is_empty() {
            continue;
        }

        let leftover = entry.senses.len();
        let form_owned = form.clone();
        entries
            .update(form, move |existing| match existing {
                Some(mut current) => {
                    current.senses.clear();
                    current
                }
                None => Entry::redirect_to(form_owned.as_str(), target.as_str()),
            })
            .await?;
        println!("{}: cleared {} leftover senses", form, leftover);
        repaired += 1;
    }

    println!("Repaired {} redirect entries", repaired);
    Ok(())
}
