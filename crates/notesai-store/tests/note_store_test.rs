//! Integration tests for the JSON-backed note store.

use std::thread::sleep;
use std::time::Duration;

use notesai_store::NoteStore;
use tempfile::TempDir;

fn open_store() -> (TempDir, NoteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = NoteStore::open(dir.path().join("notes.json"));
    (dir, store)
}

#[test]
fn create_persists_note_with_defaults() {
    let (dir, mut store) = open_store();
    let id = store.create().unwrap();

    let note = store.get(&id).unwrap();
    assert_eq!(note.title, "New Note");
    assert_eq!(note.category, "uncategorized");
    assert!(note.content.is_empty());
    assert_eq!(note.created, note.modified);

    let reopened = NoteStore::open(dir.path().join("notes.json"));
    assert_eq!(reopened.get(&id), Some(note));
}

#[test]
fn created_ids_are_unique() {
    let (_dir, mut store) = open_store();
    let ids: Vec<String> = (0..20).map(|_| store.create().unwrap()).collect();
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
    assert_eq!(store.len(), 20);
}

#[test]
fn update_round_trip_advances_modified() {
    let (dir, mut store) = open_store();
    let id = store.create().unwrap();

    assert!(store.update(&id, "T", "C"));

    let note = store.get(&id).unwrap();
    assert_eq!(note.title, "T");
    assert_eq!(note.content, "C");
    assert!(note.modified > note.created);

    let reopened = NoteStore::open(dir.path().join("notes.json"));
    let persisted = reopened.get(&id).unwrap();
    assert_eq!(persisted.title, "T");
    assert_eq!(persisted.modified, note.modified);
}

#[test]
fn update_unknown_id_returns_false() {
    let (_dir, mut store) = open_store();
    assert!(!store.update("note_missing", "T", "C"));
    assert!(!store.update_category("note_missing", "Finance"));
    assert!(store.is_empty());
}

#[test]
fn update_category_overwrites_category() {
    let (_dir, mut store) = open_store();
    let id = store.create().unwrap();
    let before = store.get(&id).unwrap().modified;

    assert!(store.update_category(&id, "Finance"));

    let note = store.get(&id).unwrap();
    assert_eq!(note.category, "Finance");
    assert!(note.modified > before);
}

#[test]
fn delete_nonexistent_id_leaves_store_unchanged() {
    let (dir, mut store) = open_store();
    let id = store.create().unwrap();
    let before = std::fs::read_to_string(dir.path().join("notes.json")).unwrap();

    assert!(!store.delete("note_missing"));
    assert!(!store.delete("note_missing"));

    assert_eq!(store.len(), 1);
    assert!(store.get(&id).is_some());
    let after = std::fs::read_to_string(dir.path().join("notes.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn delete_removes_note_from_disk() {
    let (dir, mut store) = open_store();
    let keep = store.create().unwrap();
    let drop = store.create().unwrap();

    assert!(store.delete(&drop));

    let reopened = NoteStore::open(dir.path().join("notes.json"));
    assert!(reopened.get(&drop).is_none());
    assert!(reopened.get(&keep).is_some());
}

#[test]
fn list_sorted_orders_by_modified_descending() {
    let (_dir, mut store) = open_store();
    let a = store.create().unwrap();
    let b = store.create().unwrap();
    let c = store.create().unwrap();

    sleep(Duration::from_millis(2));
    store.update(&a, "A", "edited last");

    let order: Vec<&str> = store.list_sorted().into_iter().map(|(id, _)| id).collect();
    assert_eq!(order[0], a);
    assert_eq!(order.len(), 3);
    assert!(order.contains(&b.as_str()));
    assert!(order.contains(&c.as_str()));
    assert_eq!(store.list_all().len(), 3);
}

#[test]
fn search_matches_title_content_and_category_case_insensitively() {
    let (_dir, mut store) = open_store();
    let by_title = store.create().unwrap();
    store.update(&by_title, "Finance review", "numbers");
    let by_content = store.create().unwrap();
    store.update(&by_content, "Monday", "talk to the FINANCE team");
    let by_category = store.create().unwrap();
    store.update(&by_category, "Receipts", "scan them");
    sleep(Duration::from_millis(2));
    store.update_category(&by_category, "Finance");
    let unrelated = store.create().unwrap();
    store.update(&unrelated, "Trip", "pack bags");

    let hits: Vec<&str> = store.search("finance").into_iter().map(|(id, _)| id).collect();

    assert_eq!(hits.len(), 3);
    assert!(!hits.contains(&unrelated.as_str()));
    assert_eq!(hits[0], by_category);
    let results = store.search("finance");
    for pair in results.windows(2) {
        assert!(pair[0].1.modified >= pair[1].1.modified);
    }
}

#[test]
fn search_with_empty_query_returns_everything() {
    let (_dir, mut store) = open_store();
    store.create().unwrap();
    store.create().unwrap();
    assert_eq!(store.search("").len(), 2);
}

#[test]
fn corrupt_document_opens_empty_and_is_replaced_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(&path, "{ truncated").unwrap();

    let mut store = NoteStore::open(&path);
    assert!(store.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ truncated");

    let id = store.create().unwrap();
    let reopened = NoteStore::open(&path);
    assert!(reopened.get(&id).is_some());
}

#[test]
fn legacy_document_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(
        &path,
        r#"{
  "note_20240301091500": {
    "title": "Courses",
    "content": "pain, lait",
    "created": "2024-03-01 09:15:00",
    "modified": "2024-03-01 09:20:00",
    "category": "Personnel"
  }
}"#,
    )
    .unwrap();

    let store = NoteStore::open(&path);
    let note = store.get("note_20240301091500").unwrap();
    assert_eq!(note.title, "Courses");
    assert_eq!(store.search("PAIN").len(), 1);
}
