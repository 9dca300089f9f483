//! End-to-end tests for the curation pipeline stages
//!
//! Each test runs a command function against file-backed stores under a
//! temp directory, the same way the binary runs a stage against the real
//! data directory.

use std::collections::BTreeMap;
use std::path::Path;

use lexd_common::config::DataPaths;
use lexd_common::corpus::{self, prefix_of};
use lexd_common::db::{ChangeStore, EntryStore, OccurrenceStore};
use lexd_common::{AnnotatedOccurrence, Change, ChangeKind, Entry, Rating, Sense};
use tempfile::TempDir;

use lexd_ct::commands;

fn data_paths(dir: &TempDir) -> DataPaths {
    DataPaths::new(dir.path().join("data"))
}

fn label(form: &str, doc_id: &str, byte_offset: i64, sense_key: &str, rating: Rating) -> AnnotatedOccurrence {
    AnnotatedOccurrence {
        form: form.to_string(),
        doc_id: doc_id.to_string(),
        byte_offset,
        sense_key: sense_key.to_string(),
        rating,
    }
}

async fn build_corpus(db_path: &Path, docs: &[(&str, &str)], forms: &[(&str, &str, i64)]) {
    let pool = lexd_common::db::open_pool(db_path).await.expect("open corpus pool");
    corpus::ensure_schema(&pool).await.expect("corpus schema");

    for (doc_id, text) in docs {
        sqlx::query("INSERT INTO docs (doc_id, text) VALUES (?, ?)")
            .bind(doc_id)
            .bind(text)
            .execute(&pool)
            .await
            .expect("insert doc");
    }
    for (form, doc_id, byte_offset) in forms {
        sqlx::query(
            "INSERT INTO occurrences (prefix, form, doc_id, byte_offset) VALUES (?, ?, ?, ?)",
        )
        .bind(prefix_of(form))
        .bind(form)
        .bind(doc_id)
        .bind(byte_offset)
        .execute(&pool)
        .await
        .expect("insert occurrence");
    }
    pool.close().await;
}

#[tokio::test]
async fn merge_senses_appends_new_and_keeps_existing() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let entries = EntryStore::open(&paths.entries_db).await.expect("open entries");
    let mut existing = Entry::new("bank");
    existing.senses = vec![Sense::new("river edge")];
    entries.put(&existing).await.expect("seed entry");

    // Handoff files: one updates "bank", one introduces "bark".
    let input_dir = dir.path().join("induced");
    std::fs::create_dir_all(&input_dir).expect("create input dir");
    let mut bank = Entry::new("bank");
    bank.senses = vec![Sense::new("River edge "), Sense::new("financial institution")];
    std::fs::write(
        input_dir.join("bank.json"),
        serde_json::to_string(&bank).expect("encode bank"),
    )
    .expect("write bank file");
    let mut bark = Entry::new("bark");
    bark.senses = vec![Sense::new("tree skin")];
    std::fs::write(
        input_dir.join("bark.json"),
        serde_json::to_string(&bark).expect("encode bark"),
    )
    .expect("write bark file");

    commands::merge_senses::run(&paths, &input_dir)
        .await
        .expect("merge senses");

    let merged = entries
        .get("bank")
        .await
        .expect("read bank")
        .expect("bank exists");
    let definitions: Vec<&str> = merged.senses.iter().map(|s| s.definition.as_str()).collect();
    // "River edge " deduplicates against "river edge"; the new sense appends.
    assert_eq!(definitions, vec!["river edge", "financial institution"]);

    let created = entries
        .get("bark")
        .await
        .expect("read bark")
        .expect("bark exists");
    assert_eq!(created.senses.len(), 1);
}

#[tokio::test]
async fn ingest_labels_replaces_relabeled_locations() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let input_dir = dir.path().join("labels");
    std::fs::create_dir_all(&input_dir).expect("create input dir");

    let batch = vec![
        label("fox", "d1", 16, "1", Rating::Good),
        label("dog", "d1", 40, "1", Rating::Poor),
    ];
    std::fs::write(
        input_dir.join("batch1.json"),
        serde_json::to_string(&batch).expect("encode batch"),
    )
    .expect("write batch");

    commands::ingest_labels::run(&paths, &input_dir)
        .await
        .expect("first ingest");

    // The oracle re-judged the fox occurrence; same location, new rating.
    let relabeled = vec![label("fox", "d1", 16, "2", Rating::Excellent)];
    std::fs::write(
        input_dir.join("batch2.json"),
        serde_json::to_string(&relabeled).expect("encode batch"),
    )
    .expect("write batch");

    commands::ingest_labels::run(&paths, &input_dir)
        .await
        .expect("second ingest");

    let store = OccurrenceStore::open(&paths.labels_db).await.expect("open labels");
    let rows = store.all_rows().await.expect("read labels");
    assert_eq!(rows.len(), 2, "relabeling must not add a row");

    let fox = rows.iter().find(|r| r.form == "fox").expect("fox label");
    assert_eq!(fox.sense_key, "2");
    assert_eq!(fox.rating, Rating::Excellent);
}

#[tokio::test]
async fn propose_prunes_targets_weak_senses_only() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let entries = EntryStore::open(&paths.entries_db).await.expect("open entries");
    let mut bank = Entry::new("bank");
    bank.senses = vec![
        Sense::new("weakly supported sense"),
        Sense::new("financial institution"),
        Sense::new("river edge"),
    ];
    entries.put(&bank).await.expect("seed bank");
    let mut coin = Entry::new("coin");
    coin.senses = vec![Sense::new("only sense")];
    entries.put(&coin).await.expect("seed coin");

    let labels = OccurrenceStore::open(&paths.labels_db).await.expect("open labels");
    labels
        .upsert_many(&[
            // Sense 1 of bank: nothing reaches excellent.
            label("bank", "d1", 0, "1", Rating::Good),
            label("bank", "d2", 5, "1", Rating::Poor),
            // Sense 2 of bank: consistently excellent.
            label("bank", "d3", 9, "2", Rating::Excellent),
            label("bank", "d4", 2, "2", Rating::Excellent),
            // Weak, but "coin" has a single sense and must survive.
            label("coin", "d5", 7, "1", Rating::Poor),
        ])
        .await
        .expect("seed labels");

    commands::propose_prunes::run(&paths, 0.5, 10)
        .await
        .expect("propose prunes");

    let changes = ChangeStore::open(&paths.changes_db).await.expect("open changes");
    let pending = changes.all_pending().await.expect("read pending");
    assert_eq!(pending.len(), 1, "only bank gets a prune proposal");

    let proposal = &pending[0];
    assert_eq!(proposal.form, "bank");
    assert_eq!(proposal.kind, ChangeKind::Prune);
    assert_eq!(proposal.before.len(), 3);
    assert_eq!(proposal.after.len(), 2);
    assert_eq!(proposal.after[0].definition, "financial institution");

    let extra = proposal.extra.as_ref().expect("prune metadata");
    assert_eq!(extra["removed"][0]["sense_key"], "1");
}

#[tokio::test]
async fn propose_prunes_skips_forms_with_a_pending_prune() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let entries = EntryStore::open(&paths.entries_db).await.expect("open entries");
    let mut bank = Entry::new("bank");
    bank.senses = vec![Sense::new("weak sense"), Sense::new("solid sense")];
    entries.put(&bank).await.expect("seed bank");

    let labels = OccurrenceStore::open(&paths.labels_db).await.expect("open labels");
    labels
        .upsert_many(&[label("bank", "d1", 0, "1", Rating::Poor)])
        .await
        .expect("seed labels");

    let changes = ChangeStore::open(&paths.changes_db).await.expect("open changes");
    let queued = Change::pending(
        ChangeKind::Prune,
        "bank",
        bank.senses.clone(),
        vec![bank.senses[1].clone()],
        None,
    );
    changes.add(&queued).await.expect("seed pending prune");

    commands::propose_prunes::run(&paths, 0.5, 10)
        .await
        .expect("propose prunes");

    let pending = changes.all_pending().await.expect("read pending");
    assert_eq!(pending.len(), 1, "no duplicate proposal while one waits");
    assert_eq!(pending[0].id, queued.id);
}

#[tokio::test]
async fn repair_redirects_clears_leftover_senses() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let entries = EntryStore::open(&paths.entries_db).await.expect("open entries");
    let mut stale = Entry::redirect_to("colour", "color");
    stale.senses = vec![Sense::new("leftover"), Sense::new("more leftover")];
    entries.put(&stale).await.expect("seed redirect");
    let mut normal = Entry::new("color");
    normal.senses = vec![Sense::new("visual property")];
    entries.put(&normal).await.expect("seed normal entry");

    commands::repair_redirects::run(&paths)
        .await
        .expect("repair redirects");

    let repaired = entries
        .get("colour")
        .await
        .expect("read colour")
        .expect("colour exists");
    assert!(repaired.senses.is_empty());
    assert_eq!(repaired.redirect.as_deref(), Some("color"));

    let untouched = entries
        .get("color")
        .await
        .expect("read color")
        .expect("color exists");
    assert_eq!(untouched.senses.len(), 1);
}

#[tokio::test]
async fn export_buckets_entries_by_leading_letter() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let entries = EntryStore::open(&paths.entries_db).await.expect("open entries");
    for form in ["apple", "Avocado", "zebra", "'bout"] {
        let mut entry = Entry::new(form);
        entry.senses = vec![Sense::new(format!("definition of {form}"))];
        entries.put(&entry).await.expect("seed entry");
    }

    let output_dir = dir.path().join("snapshot");
    commands::export::run(&paths, &output_dir)
        .await
        .expect("export");

    let a_bucket = std::fs::read_to_string(output_dir.join("a.yaml")).expect("read a.yaml");
    let decoded: BTreeMap<String, Entry> =
        serde_yaml::from_str(&a_bucket).expect("parse a.yaml");
    assert!(decoded.contains_key("apple"));
    assert!(decoded.contains_key("Avocado"));

    assert!(output_dir.join("z.yaml").exists());
    assert!(output_dir.join("special.yaml").exists());
    assert!(!output_dir.join("b.yaml").exists());
}

#[tokio::test]
async fn select_targets_writes_percent_encoded_files() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let corpus_path = dir.path().join("corpus.db");
    build_corpus(
        &corpus_path,
        &[("d1", "The quick brown fox jumps over the lazy dog, can't it")],
        &[("fox", "d1", 16), ("dog", "d1", 40), ("can't", "d1", 45)],
    )
    .await;

    let output_dir = dir.path().join("targets");
    commands::select_targets::run(&paths, &corpus_path, 10, &output_dir, Some(42))
        .await
        .expect("select targets");

    // All three forms fit under top_n, so all three get target files.
    assert!(output_dir.join("fox.json").exists());
    assert!(output_dir.join("dog.json").exists());
    let encoded = output_dir.join("can%27t.json");
    assert!(encoded.exists(), "apostrophe must be percent-encoded");

    let raw = std::fs::read_to_string(encoded).expect("read target file");
    let target: serde_json::Value = serde_json::from_str(&raw).expect("parse target file");
    assert_eq!(target["form"], "can't");
}

#[tokio::test]
async fn validate_labels_reports_stale_offsets() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let corpus_path = dir.path().join("corpus.db");
    build_corpus(
        &corpus_path,
        &[("d1", "The quick brown fox jumps over the lazy dog")],
        &[("fox", "d1", 16)],
    )
    .await;

    let labels = OccurrenceStore::open(&paths.labels_db).await.expect("open labels");
    labels
        .upsert_many(&[label("fox", "d1", 16, "1", Rating::Good)])
        .await
        .expect("seed labels");

    commands::validate_labels::run(&paths, &corpus_path)
        .await
        .expect("clean labels pass");

    // The document was re-crawled and the offset drifted.
    labels
        .upsert_many(&[label("fox", "d1", 17, "1", Rating::Good)])
        .await
        .expect("seed drifted label");

    let err = commands::validate_labels::run(&paths, &corpus_path)
        .await
        .expect_err("drifted label must fail validation");
    assert!(err.to_string().contains("stale"));
}

#[tokio::test]
async fn instances_rejects_a_malformed_sense_key() {
    let dir = TempDir::new().expect("create temp dir");
    let paths = data_paths(&dir);
    paths.ensure_dir().expect("create data dir");

    let corpus_path = dir.path().join("corpus.db");
    let err = commands::instances::run(&paths, &corpus_path, "fox", "bogus", 2, 10, 80)
        .await
        .expect_err("malformed key must be rejected");
    assert!(err.to_string().contains("sense key"));
}
