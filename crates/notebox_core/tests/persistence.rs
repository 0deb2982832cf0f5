use notebox_core::db::{open_db, open_db_in_memory};
use notebox_core::{
    DocumentRepository, DocumentService, ItemChange, ItemKind, SqliteDocumentRepository,
    StoreError, STORAGE_KEY,
};

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn put_payload(conn: &rusqlite::Connection, payload: &str) {
    conn.execute(
        "INSERT INTO kv_state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        rusqlite::params![STORAGE_KEY, payload],
    )
    .unwrap();
}

#[test]
fn missing_key_loads_as_empty_collection() {
    let conn = setup();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    assert!(repo.load_items().unwrap().is_empty());
}

#[test]
fn collection_round_trips_through_storage() {
    let conn = setup();

    {
        let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
        let mut docs = DocumentService::load(repo).unwrap();
        let folder = docs.create(ItemKind::Folder, None).unwrap();
        let note = docs.create(ItemKind::Container, Some(folder)).unwrap();
        docs.update(note, ItemChange::Title("groceries".to_string()))
            .unwrap();
        docs.update(note, ItemChange::Content("milk<br>eggs".to_string()))
            .unwrap();
        docs.set_expanded(note, true);
    }

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let docs = DocumentService::load(repo).unwrap();
    assert_eq!(docs.items().len(), 2);

    let folder = &docs.items()[0];
    let note = &docs.items()[1];
    assert_eq!(folder.kind, ItemKind::Folder);
    assert_eq!(note.kind, ItemKind::Container);
    assert_eq!(note.parent_id, Some(folder.id));
    assert_eq!(note.title, "groceries");
    assert_eq!(note.content, "milk<br>eggs");
    assert!(note.last_modified.is_some());
    // Expansion is transient and never survives a reload.
    assert!(!note.expanded);
}

#[test]
fn legacy_records_are_defaulted_not_rejected() {
    let conn = setup();
    put_payload(
        &conn,
        r#"[
            {"id": 1, "type": "folder", "expanded": true},
            {"id": 2, "parentId": 1, "lastModified": "2024-03-01T10:00:00Z"},
            {"id": 3, "kind": "gadget", "lastModified": "not-a-date"}
        ]"#,
    );

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let items = repo.load_items().unwrap();
    assert_eq!(items.len(), 3);

    assert_eq!(items[0].kind, ItemKind::Folder);
    assert!(!items[0].expanded);

    assert_eq!(items[1].kind, ItemKind::Container);
    assert_eq!(items[1].title, "");
    assert_eq!(items[1].parent_id, Some(1));
    assert!(items[1].last_modified.is_some());

    assert_eq!(items[2].kind, ItemKind::Container);
    assert_eq!(items[2].last_modified, None);
}

#[test]
fn unparseable_payload_is_surfaced_as_invalid() {
    let conn = setup();
    put_payload(&conn, "{not json at all");

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let err = repo.load_items().unwrap_err();
    assert!(matches!(err, StoreError::InvalidPayload(_)));
}

#[test]
fn repository_requires_migrated_schema() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteDocumentRepository::try_new(&conn).unwrap_err();
    assert!(matches!(err, StoreError::UninitializedConnection { .. }));
}

#[test]
fn file_backed_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notebox.sqlite");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
        let mut docs = DocumentService::load(repo).unwrap();
        let note = docs.create(ItemKind::Container, None).unwrap();
        docs.update(note, ItemChange::Title("persisted".to_string()))
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let docs = DocumentService::load(repo).unwrap();
    assert_eq!(docs.items().len(), 1);
    assert_eq!(docs.items()[0].title, "persisted");
}
