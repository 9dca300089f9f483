//! List case-variant entry pairs that could become redirects.
//!
//! Report only; turning a candidate into an actual redirect stays a
//! human decision because capitalization is sometimes meaningful
//! ("Polish" is not "polish").

use anyhow::Result;
use lexd_common::config::DataPaths;
use lexd_common::db::EntryStore;
use lexd_common::model::redirect_candidates;

pub async fn run(paths: &DataPaths) -> Result<()> {
    let entries = EntryStore::open(&paths.entries_db).await?.all_entries().await?;

    let pairs = redirect_candidates(&entries);
    if pairs.is_empty() {
        println!("No case-variant redirect candidates found");
        return Ok(());
    }

    for (from, to) in &pairs {
        println!("{} -> {}", from, to);
    }
    println!("{} candidate pairs", pairs.len());
    Ok(())
}
