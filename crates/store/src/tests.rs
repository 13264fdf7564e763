//! Tests for the document store.

use std::fs;
use std::path::Path;

use docnav_core::config::IngestConfig;

use super::DocumentStore;

fn store_in(dir: &Path) -> DocumentStore {
    let config = IngestConfig {
        upload_dir: dir.join("uploads"),
        ..IngestConfig::default()
    };
    DocumentStore::new(config).unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn ingest_assigns_sequential_ordinals_and_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
    let path = write_file(dir.path(), "notes.txt", text);
    let info = store.ingest_file(&path, None);

    assert_eq!(info.doc_name, "notes.txt");
    assert_eq!(info.pages, 1);
    assert!(info.chunks >= 1);

    let mut seen = std::collections::HashSet::new();
    for (i, chunk) in store.all_chunks().iter().enumerate() {
        assert_eq!(chunk.ordinal, i);
        assert_eq!(chunk.chunk_id, format!("{}:{}", chunk.doc_id, chunk.ordinal));
        assert!(seen.insert(chunk.chunk_id.clone()), "duplicate chunk_id");
        assert!(chunk.paragraph_start <= chunk.paragraph_end);
        assert!(!chunk.text.is_empty());
    }
}

#[test]
fn version_bumps_once_per_ingest_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());
    assert_eq!(store.version(), 0);

    let a = write_file(dir.path(), "a.txt", "Alpha text.");
    let b = write_file(dir.path(), "b.txt", "Beta text.");
    store.ingest_file(&a, None);
    assert_eq!(store.version(), 1);
    store.ingest_file(&b, None);
    assert_eq!(store.version(), 2);

    store.clear(false);
    assert_eq!(store.version(), 3);
    assert!(store.all_chunks().is_empty());
    assert!(store.list_documents().is_empty());
}

#[test]
fn reingest_replaces_prior_generation() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let path = write_file(dir.path(), "doc.txt", "Original body of the document.");
    let first = store.ingest_file(&path, None);

    fs::write(&path, "Replacement body, entirely new.").unwrap();
    let second = store.ingest_file(&path, None);

    assert_eq!(first.doc_id, second.doc_id, "doc_id is stable per display name");
    assert_eq!(store.list_documents().len(), 1);

    let texts: Vec<&str> = store.all_chunks().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Replacement body, entirely new."]);
    // Ordinals restart at zero for the new generation.
    assert_eq!(store.all_chunks()[0].ordinal, 0);
}

#[test]
fn ingest_folder_is_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    write_file(&docs, "b.txt", "Bravo contents.");
    write_file(&docs, "a.txt", "Alpha contents.");
    write_file(&docs, "ignored.csv", "x,y\n1,2");

    let infos = store.ingest_folder(&docs, None);
    let names: Vec<&str> = infos.iter().map(|i| i.doc_name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(store.version(), 2, "one bump per ingested document");
}

#[test]
fn ingest_folder_missing_path_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    assert!(store.ingest_folder(&dir.path().join("nope"), None).is_empty());
    let file = write_file(dir.path(), "f.txt", "text");
    assert!(store.ingest_folder(&file, None).is_empty(), "file is not a directory");
    assert_eq!(store.version(), 0);
}

#[test]
fn ingest_folder_honours_custom_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    write_file(&docs, "keep.md", "# Kept\n\nBody.");
    write_file(&docs, "skip.txt", "Skipped.");

    let only_md = vec![".md".to_string()];
    let infos = store.ingest_folder(&docs, Some(&only_md));
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].doc_name, "keep.md");
}

#[test]
fn clear_deletes_stored_files_best_effort() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let uploads = store.upload_dir().to_path_buf();
    let kept = write_file(&uploads, "doc.txt", "Uploaded body.");
    let untouched = write_file(&uploads, "other.dat", "binary-ish");
    store.ingest_file(&kept, None);

    store.clear(true);
    assert!(!kept.exists(), "allowed-extension files are deleted");
    assert!(untouched.exists(), "non-matching files are left alone");
    assert!(store.all_chunks().is_empty());
}

#[test]
fn empty_file_yields_zero_chunk_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let path = write_file(dir.path(), "empty.txt", "");
    let info = store.ingest_file(&path, None);
    assert_eq!(info.chunks, 0);
    assert_eq!(info.pages, 1);
    assert!(store.all_chunks().is_empty());
    assert_eq!(store.version(), 1, "a mutating call still bumps the version");
}

#[test]
fn unreadable_file_degrades_to_zero_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let info = store.ingest_file(&dir.path().join("missing.txt"), None);
    assert_eq!(info.chunks, 0);
    assert_eq!(info.pages, 0);
    assert_eq!(store.version(), 1);
}

#[test]
fn redaction_is_applied_before_packing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let path = write_file(
        dir.path(),
        "pii.txt",
        "Patient SSN 123-45-6789 and email jane@example.com on record.",
    );
    store.ingest_file(&path, None);

    let text = &store.all_chunks()[0].text;
    assert!(text.contains("[REDACTED_SSN]"));
    assert!(text.contains("[REDACTED_EMAIL]"));
    assert!(!text.contains("123-45-6789"));
}

#[test]
fn redaction_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = IngestConfig {
        upload_dir: dir.path().join("uploads"),
        enable_pii_redaction: false,
        ..IngestConfig::default()
    };
    let mut store = DocumentStore::new(config).unwrap();

    let path = write_file(dir.path(), "pii.txt", "SSN 123-45-6789 stays.");
    store.ingest_file(&path, None);
    assert!(store.all_chunks()[0].text.contains("123-45-6789"));
}

#[test]
fn large_text_is_pseudo_paged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let section = "Lorem ipsum dolor sit amet, consectetur adipiscing elit sed do.".repeat(20);
    let body = [section.as_str(); 5].join("\n\n"); // ~6300 chars forces a split
    let path = write_file(dir.path(), "long.txt", &body);

    let info = store.ingest_file(&path, None);
    assert!(info.pages >= 2, "expected pseudo-pagination, got {} page(s)", info.pages);
    assert!(store.all_chunks().iter().any(|c| c.page > 1));
}

#[test]
fn display_name_override_controls_identity() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    let path_a = write_file(dir.path(), "v1.txt", "Shared display name, first body.");
    let path_b = write_file(dir.path(), "v2.txt", "Shared display name, second body.");

    store.ingest_file(&path_a, Some("shared.txt"));
    store.ingest_file(&path_b, Some("shared.txt"));

    assert_eq!(store.list_documents().len(), 1, "same display name upserts");
    assert!(store.all_chunks()[0].text.contains("second body"));
}
