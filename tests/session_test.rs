// Tests for the session store and catalog

use std::fs;

use quill::session::{
    MessageEvent, Order, SessionCatalog, SessionError, SessionId, SessionStore,
};
use tempfile::TempDir;

fn create_test_store() -> (SessionStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = SessionStore::with_root(temp_dir.path().join("sessions"));
    (store, temp_dir)
}

#[test]
fn test_append_load_round_trip_survives_store_restart() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("sessions");

    // First process lifetime: create and append two events.
    let id = {
        let store = SessionStore::with_root(&root);
        let mut session = store.create().unwrap();
        store.append(&mut session, &MessageEvent::user("one")).unwrap();
        store
            .append(&mut session, &MessageEvent::assistant("two"))
            .unwrap();
        session.id()
    };

    // Second lifetime: resume and append one more.
    {
        let store = SessionStore::with_root(&root);
        let catalog = SessionCatalog::new(&store);
        let (mut session, history) = catalog.resume(&id).unwrap();
        assert_eq!(history.events.len(), 2);
        store
            .append(&mut session, &MessageEvent::user("three"))
            .unwrap();
    }

    // Third lifetime: nothing duplicated, nothing dropped, order kept.
    let store = SessionStore::with_root(&root);
    let history = store.load(&id).unwrap();
    let contents: Vec<&str> = history.events.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    assert!(!history.is_partial());
    assert_eq!(store.metadata(&id).unwrap().turn_count, 3);
}

#[test]
fn test_resume_appends_to_the_same_log() {
    let (store, _temp) = create_test_store();

    let mut session = store.create().unwrap();
    for content in ["a", "b", "c"] {
        store.append(&mut session, &MessageEvent::user(content)).unwrap();
    }

    let catalog = SessionCatalog::new(&store);
    let (mut resumed, history) = catalog.resume(&session.id()).unwrap();
    assert_eq!(history.events.len(), 3);

    store.append(&mut resumed, &MessageEvent::assistant("d")).unwrap();

    let history = store.load(&session.id()).unwrap();
    let contents: Vec<&str> = history.events.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "b", "c", "d"]);
    assert_eq!(store.metadata(&session.id()).unwrap().turn_count, 4);
}

#[test]
fn test_list_matches_creation_order_across_restarts() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("sessions");

    let mut created = Vec::new();
    for _ in 0..3 {
        // Fresh store instance per session simulates process restarts.
        let store = SessionStore::with_root(&root);
        created.push(store.create().unwrap().id());
    }

    let store = SessionStore::with_root(&root);
    let catalog = SessionCatalog::new(&store);

    let oldest: Vec<SessionId> = catalog
        .list(Order::OldestFirst)
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(oldest, created);

    let newest: Vec<SessionId> = catalog
        .list(Order::NewestFirst)
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    let reversed: Vec<SessionId> = created.into_iter().rev().collect();
    assert_eq!(newest, reversed);
}

#[test]
fn test_truncated_tail_yields_partial_history_not_failure() {
    let (store, _temp) = create_test_store();

    let mut session = store.create().unwrap();
    store.append(&mut session, &MessageEvent::user("intact 1")).unwrap();
    store
        .append(&mut session, &MessageEvent::assistant("intact 2"))
        .unwrap();
    store.append(&mut session, &MessageEvent::user("doomed")).unwrap();

    // Simulate a crash mid-write by cutting the last line short.
    let log = store.path_for(&session.id()).join("history.jsonl");
    let content = fs::read_to_string(&log).unwrap();
    fs::write(&log, &content[..content.len() - 20]).unwrap();

    let history = store.load(&session.id()).unwrap();
    assert!(history.is_partial());
    assert_eq!(history.events.len(), 2);
    assert_eq!(history.events[0].content, "intact 1");
    assert_eq!(history.events[1].content, "intact 2");
}

#[test]
fn test_unknown_resume_target_is_reported() {
    let (store, _temp) = create_test_store();
    let catalog = SessionCatalog::new(&store);

    let missing = SessionId::generate();
    match catalog.resume(&missing) {
        Err(SessionError::NotFound(id)) => assert_eq!(id, missing.to_string()),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_invalid_resume_id_is_rejected_before_disk_access() {
    assert!(matches!(
        SessionId::parse("definitely/not/a/session"),
        Err(SessionError::InvalidId(_))
    ));
}

#[test]
fn test_metadata_tracks_title_and_timestamps() {
    let (store, _temp) = create_test_store();

    let mut session = store.create().unwrap();
    let created_at = session.meta.created_at;

    store
        .append(&mut session, &MessageEvent::user("what is rust?"))
        .unwrap();
    store.set_title(&mut session, "what is rust?").unwrap();

    let meta = store.metadata(&session.id()).unwrap();
    assert_eq!(meta.title, "what is rust?");
    assert_eq!(meta.created_at, created_at);
    assert!(meta.updated_at >= created_at);
}
