use std::fs;

use pretty_assertions::assert_eq;

use crate::{
    form::{FieldValue, FormSnapshot},
    session::{
        AcceptNonEmpty, AuthError, AuthProvider, COMMITTED_KEY, Credentials, DRAFT_KEY,
        FileBackend, LOGGED_IN_KEY, MemoryBackend, SessionBackend, SessionError, SessionRecord,
        SessionStore, USER_KEY,
    },
};

#[test]
fn fresh_store_is_anonymous_and_empty() {
    let store = SessionStore::in_memory();
    assert!(!store.is_authenticated());
    assert_eq!(store.record().unwrap(), SessionRecord::default());
}

#[test]
fn login_writes_the_flag_and_the_actor() {
    let mut store = SessionStore::in_memory();
    store.login("alice").unwrap();
    assert!(store.is_authenticated());
    assert_eq!(store.actor_name().as_deref(), Some("alice"));
    assert_eq!(store.backend().get(LOGGED_IN_KEY).as_deref(), Some("true"));
    assert_eq!(store.backend().get(USER_KEY).as_deref(), Some("alice"));

    store.login("bob").unwrap();
    assert_eq!(store.actor_name().as_deref(), Some("bob"));
}

#[test]
fn only_the_exact_flag_counts_as_authenticated() {
    let mut backend = MemoryBackend::new();
    backend.set(LOGGED_IN_KEY, "TRUE".into()).unwrap();
    assert!(!SessionStore::new(backend).is_authenticated());
}

#[test]
fn drafts_are_stored_unvalidated_and_replaced() {
    let mut store = SessionStore::in_memory();
    let first = FormSnapshot::new()
        .with("vendor", "vendor1")
        .with("totalAmount", "not a number");
    store.save_draft(&first).unwrap();
    assert_eq!(store.draft().unwrap(), Some(first));

    let second = FormSnapshot::new().with("vendor", FieldValue::Absent);
    store.save_draft(&second).unwrap();
    assert_eq!(store.draft().unwrap(), Some(second));
    assert_eq!(store.committed().unwrap(), None);
}

#[test]
fn corrupt_records_surface_as_errors() {
    let mut backend = MemoryBackend::new();
    backend.set(DRAFT_KEY, "{not json".into()).unwrap();
    backend.set(COMMITTED_KEY, "[1, 2]".into()).unwrap();
    let store = SessionStore::new(backend);

    assert!(matches!(
        store.draft(),
        Err(SessionError::CorruptRecord { key: DRAFT_KEY, .. })
    ));
    assert!(matches!(
        store.committed(),
        Err(SessionError::CorruptRecord {
            key: COMMITTED_KEY,
            ..
        })
    ));
    assert!(store.record().is_err());
}

#[test]
fn file_backend_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    let draft = FormSnapshot::new()
        .with("invoiceNumber", "INV-3")
        .with("lineAmount", 40.0);

    {
        let mut store = SessionStore::new(FileBackend::open(&path).unwrap());
        store.login("alice").unwrap();
        store.save_draft(&draft).unwrap();
    }

    let reopened = SessionStore::new(FileBackend::open(&path).unwrap());
    assert!(reopened.is_authenticated());
    assert_eq!(reopened.actor_name().as_deref(), Some("alice"));
    assert_eq!(reopened.draft().unwrap(), Some(draft));
    assert_eq!(reopened.backend().path(), path.as_path());
}

#[test]
fn failed_writes_leave_the_session_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("session.json");

    let mut store = SessionStore::new(FileBackend::open(&path).unwrap());
    assert!(matches!(store.login("alice"), Err(SessionError::Io { .. })));
    assert!(!store.is_authenticated());
    assert_eq!(store.actor_name(), None);

    let draft = FormSnapshot::new().with("vendor", "vendor1");
    assert!(store.save_draft(&draft).is_err());
    assert_eq!(store.draft().unwrap(), None);
    assert!(store.backend().get(DRAFT_KEY).is_none());
}

#[test]
fn committed_reads_return_what_was_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SessionStore::new(FileBackend::open(dir.path().join("s.json")).unwrap());
    let record = FormSnapshot::new()
        .with("invoiceDate", "2024-04-01")
        .with("totalAmount", "250.00")
        .with("comments", FieldValue::Absent);
    store.commit(&record).unwrap();
    assert_eq!(store.committed().unwrap(), Some(record));
}

#[test]
fn file_backend_treats_empty_files_as_empty_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "  \n").unwrap();
    let store = SessionStore::new(FileBackend::open(&path).unwrap());
    assert!(!store.is_authenticated());
}

#[test]
fn file_backend_rejects_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, r#"{"isLoggedIn": true}"#).unwrap();
    assert!(matches!(
        FileBackend::open(&path),
        Err(SessionError::Format { .. })
    ));
}

#[test]
fn accept_non_empty_checks_presence_only() {
    let auth = AcceptNonEmpty;
    assert_eq!(
        auth.authenticate(&Credentials::new("alice", "x")),
        Ok("alice".to_string())
    );
    assert_eq!(
        auth.authenticate(&Credentials::new("", "x")),
        Err(AuthError::MissingUsername)
    );
    assert_eq!(
        auth.authenticate(&Credentials::new("alice", "")),
        Err(AuthError::MissingPassword)
    );
}
