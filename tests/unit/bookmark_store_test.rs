//! Unit tests for the BookmarkStore public API.
//!
//! These tests exercise persistence, shallow-merge updates and the import/export
//! reconciliation through the `BookmarkStoreTrait` interface, using the in-memory
//! backend unless a test needs a real file.

use linkstash::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait, STORAGE_KEY};
use linkstash::storage::{FileBackend, MemoryBackend, StorageBackend};
use linkstash::types::bookmark::{Bookmark, BookmarkPatch, ImportStats, Platform};
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

/// Helper: a bookmark with a fixed creation time.
fn bookmark(id: &str, url: &str, title: &str) -> Bookmark {
    Bookmark::new(id.into(), url.into(), Platform::Website, title.into(), 1_700_000_000_000)
}

fn store() -> BookmarkStore<MemoryBackend> {
    BookmarkStore::new(MemoryBackend::new())
}

fn ids(bookmarks: &[Bookmark]) -> Vec<&str> {
    bookmarks.iter().map(|b| b.id.as_str()).collect()
}

#[test]
fn test_get_all_on_empty_backend() {
    assert!(store().get_all().is_empty());
}

#[test]
fn test_add_prepends() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();
    store.add(bookmark("2", "https://b.com", "B")).unwrap();

    assert_eq!(ids(&store.get_all()), vec!["2", "1"]);
}

#[test]
fn test_malformed_persisted_value_reads_as_empty() {
    let store = BookmarkStore::new(MemoryBackend::with_entry(STORAGE_KEY, "this is not json"));
    assert!(store.get_all().is_empty());
}

#[test]
fn test_persisted_object_instead_of_array_reads_as_empty() {
    let store = BookmarkStore::new(MemoryBackend::with_entry(STORAGE_KEY, "{\"id\": \"1\"}"));
    assert!(store.get_all().is_empty());
}

#[test]
fn test_update_shallow_merges() {
    let mut store = store();
    let mut original = bookmark("1", "https://a.com", "A");
    original.tags = vec!["keep".into()];
    store.add(original).unwrap();

    let patch = BookmarkPatch {
        title: Some("Renamed".into()),
        favorite: Some(true),
        ..BookmarkPatch::default()
    };
    assert!(store.update("1", patch).unwrap());

    let updated = &store.get_all()[0];
    assert_eq!(updated.title, "Renamed");
    assert!(updated.favorite);
    assert_eq!(updated.tags, vec!["keep".to_string()]);
    assert_eq!(updated.url, "https://a.com");
}

#[test]
fn test_update_unknown_id_is_silent_noop() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();
    let before = store.get_all();

    assert!(!store.update("missing", BookmarkPatch::favorite(true)).unwrap());
    assert_eq!(store.get_all(), before);
}

#[test]
fn test_delete_then_update_is_noop() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();
    store.add(bookmark("2", "https://b.com", "B")).unwrap();

    store.delete("1").unwrap();
    assert!(!store.update("1", BookmarkPatch::favorite(true)).unwrap());
    assert_eq!(ids(&store.get_all()), vec!["2"]);
}

#[test]
fn test_delete_unknown_keeps_collection() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();
    store.delete("nope").unwrap();
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn test_clear_removes_key() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();

    store.clear().unwrap();

    assert!(store.get_all().is_empty());
    assert!(!store.backend().contains_key(STORAGE_KEY));
}

#[test]
fn test_export_is_pretty_printed_array() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();

    let exported = store.export().unwrap();
    assert!(exported.starts_with("[\n  {\n    \"id\": \"1\""));
    let parsed: Vec<Bookmark> = serde_json::from_str(&exported).unwrap();
    assert_eq!(parsed, store.get_all());
}

#[test]
fn test_export_of_empty_store() {
    assert_eq!(store().export().unwrap(), "[]");
}

#[test]
fn test_import_rejects_non_json() {
    let mut store = store();
    assert!(!store.import("not json at all").unwrap());
    assert!(store.import_stats("not json at all").is_none());
}

#[test]
fn test_import_rejects_top_level_object() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();
    let before = store.get_all();

    assert!(!store.import("{\"bookmarks\": []}").unwrap());
    assert_eq!(store.get_all(), before);
}

#[test]
fn test_import_drops_invalid_records() {
    let mut store = store();
    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "A"},
        {"id": "b", "title": "missing url"},
    ])
    .to_string();

    assert_eq!(
        store.import_stats(&data),
        Some(ImportStats { total: 1, new: 1, duplicates: 0 })
    );
    assert!(store.import(&data).unwrap());
    assert_eq!(ids(&store.get_all()), vec!["a"]);
}

#[test]
fn test_import_prepends_block_in_input_order() {
    let mut store = store();
    store.add(bookmark("old", "https://old.com", "Old")).unwrap();

    let data = json!([
        {"id": "x", "url": "https://x.org", "title": "X"},
        {"id": "y", "url": "https://y.org", "title": "Y"},
    ])
    .to_string();
    assert!(store.import(&data).unwrap());

    assert_eq!(ids(&store.get_all()), vec!["x", "y", "old"]);
}

#[test]
fn test_import_skips_existing_ids() {
    let mut store = store();
    store.add(bookmark("a", "https://a.com", "Mine")).unwrap();

    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "Theirs"},
        {"id": "b", "url": "https://b.com", "title": "B"},
    ])
    .to_string();

    assert_eq!(
        store.import_stats(&data),
        Some(ImportStats { total: 2, new: 1, duplicates: 1 })
    );
    assert!(store.import(&data).unwrap());

    let all = store.get_all();
    assert_eq!(ids(&all), vec!["b", "a"]);
    assert_eq!(all[1].title, "Mine", "existing record must not be overwritten");
}

#[test]
fn test_import_dedupes_within_payload() {
    let mut store = store();
    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "First"},
        {"id": "a", "url": "https://a.com", "title": "Second"},
    ])
    .to_string();

    assert_eq!(
        store.import_stats(&data),
        Some(ImportStats { total: 2, new: 1, duplicates: 1 })
    );
    assert!(store.import(&data).unwrap());
    let all = store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "First");
}

#[test]
fn test_import_defaults_created_at() {
    let mut store = store();
    let before = chrono::Utc::now().timestamp_millis();
    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "A"},
        {"id": "b", "url": "https://b.com", "title": "B", "createdAt": 42},
    ])
    .to_string();
    assert!(store.import(&data).unwrap());

    let all = store.get_all();
    assert!(all[0].created_at >= before);
    assert_eq!(all[1].created_at, 42);
}

#[test]
fn test_import_passes_unknown_fields_through() {
    let mut store = store();
    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "A", "platform": "website", "folder": "work"},
    ])
    .to_string();
    assert!(store.import(&data).unwrap());

    let exported: serde_json::Value = serde_json::from_str(&store.export().unwrap()).unwrap();
    assert_eq!(exported[0]["folder"], json!("work"));
}

#[rstest]
#[case::favorite_not_bool(json!({"favorite": "yes"}))]
#[case::created_at_date_string(json!({"createdAt": "2024-01-01T00:00:00Z"}))]
#[case::created_at_float(json!({"createdAt": 1700000000000.0}))]
#[case::tags_not_array(json!({"tags": "rust"}))]
#[case::image_not_string(json!({"image": {"src": "a.png"}}))]
#[case::platform_not_string(json!({"platform": 7}))]
fn test_import_accepts_mistyped_optional_fields(#[case] extra: serde_json::Value) {
    let mut record = json!({"id": "1", "url": "https://a.com", "title": "A"});
    for (key, value) in extra.as_object().unwrap() {
        record[key] = value.clone();
    }
    let data = json!([record]).to_string();

    let mut store = store();
    assert_eq!(
        store.import_stats(&data),
        Some(ImportStats { total: 1, new: 1, duplicates: 0 })
    );
    assert!(store.import(&data).unwrap());
    assert_eq!(ids(&store.get_all()), vec!["1"]);
}

#[test]
fn test_import_coerces_mistyped_fields_to_defaults() {
    let mut store = store();
    let before = chrono::Utc::now().timestamp_millis();
    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "A", "favorite": "yes", "tags": "rust", "createdAt": "2024-01-01"},
        {"id": "b", "url": "https://b.com", "title": "B", "createdAt": 1700000000000.0, "tags": ["x", 2]},
    ])
    .to_string();
    assert!(store.import(&data).unwrap());

    let all = store.get_all();
    assert!(!all[0].favorite);
    assert!(all[0].tags.is_empty());
    assert!(all[0].created_at >= before);
    assert_eq!(all[1].created_at, 1_700_000_000_000);
    assert_eq!(all[1].tags, vec!["x".to_string()]);
}

#[test]
fn test_import_of_empty_array_succeeds() {
    let mut store = store();
    assert_eq!(
        store.import_stats("[]"),
        Some(ImportStats { total: 0, new: 0, duplicates: 0 })
    );
    assert!(store.import("[]").unwrap());
}

#[test]
fn test_second_import_is_all_duplicates() {
    let mut store = store();
    let data = json!([
        {"id": "a", "url": "https://a.com", "title": "A"},
        {"id": "b", "url": "https://youtu.be/xyz", "title": "B"},
    ])
    .to_string();
    assert!(store.import(&data).unwrap());
    let after_first = store.get_all();

    let stats = store.import_stats(&data).unwrap();
    assert_eq!(stats.new, 0);
    assert_eq!(stats.duplicates, stats.total);
    assert!(store.import(&data).unwrap());
    assert_eq!(store.get_all(), after_first);
}

#[test]
fn test_file_backed_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = BookmarkStore::new(FileBackend::new(dir.path()));
        store.add(bookmark("1", "https://a.com", "A")).unwrap();
    }
    let store = BookmarkStore::new(FileBackend::new(dir.path()));
    assert_eq!(ids(&store.get_all()), vec!["1"]);
}

#[test]
fn test_store_writes_compact_json_under_key() {
    let mut store = store();
    store.add(bookmark("1", "https://a.com", "A")).unwrap();
    let raw = store.backend().get(STORAGE_KEY).unwrap().unwrap();
    assert!(raw.starts_with("[{\"id\":\"1\""));
}
