use serde_json::json;
use viewstore_core::db::open_db_in_memory;
use viewstore_core::{Document, DocumentRepository, RepoError, SqliteDocumentRepository};

fn doc(value: serde_json::Value) -> Document {
    Document::from_value(value).expect("test document should parse")
}

#[test]
fn put_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::new(&conn);

    let stored = doc(json!({"_id": "d1", "type": "note", "body": "hello"}));
    let seq = repo.put_document(&stored).unwrap();
    assert_eq!(seq, 1);

    let loaded = repo.get_document("d1").unwrap().unwrap();
    assert_eq!(loaded, stored);
}

#[test]
fn put_replaces_and_bumps_sequence() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::new(&conn);

    repo.put_document(&doc(json!({"_id": "d1", "v": 1}))).unwrap();
    let seq = repo.put_document(&doc(json!({"_id": "d1", "v": 2}))).unwrap();
    assert_eq!(seq, 2);

    let loaded = repo.get_document("d1").unwrap().unwrap();
    assert_eq!(loaded.field("v"), Some(&json!(2)));
}

#[test]
fn delete_tombstones_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::new(&conn);

    repo.put_document(&doc(json!({"_id": "d1"}))).unwrap();
    let delete_seq = repo.delete_document("d1").unwrap();
    assert_eq!(delete_seq, 2);
    assert_eq!(repo.get_document("d1").unwrap(), None);

    // Deleting twice, or deleting an unknown id, is NotFound.
    let err = repo.delete_document("d1").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "d1"));
    let err = repo.delete_document("missing").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn changes_feed_reports_writes_in_sequence_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::new(&conn);

    repo.put_document(&doc(json!({"_id": "a"}))).unwrap();
    repo.put_document(&doc(json!({"_id": "b"}))).unwrap();
    repo.delete_document("a").unwrap();

    let changes = repo.changes_since(0, None).unwrap();
    assert_eq!(changes.len(), 2);

    // `a` appears once, at its delete sequence, as a tombstone.
    assert_eq!(changes[0].doc_id, "b");
    assert_eq!(changes[0].seq, 2);
    assert!(!changes[0].deleted);
    assert!(changes[0].document.is_some());

    assert_eq!(changes[1].doc_id, "a");
    assert_eq!(changes[1].seq, 3);
    assert!(changes[1].deleted);
    assert_eq!(changes[1].document, None);
}

#[test]
fn changes_feed_respects_since_and_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::new(&conn);

    for idx in 0..5 {
        repo.put_document(&doc(json!({"_id": format!("d{idx}")}))).unwrap();
    }

    let changes = repo.changes_since(3, None).unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].seq, 4);

    let changes = repo.changes_since(0, Some(2)).unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].seq, 2);

    let changes = repo.changes_since(100, None).unwrap();
    assert!(changes.is_empty());
}
