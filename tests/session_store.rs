//! File-backed session store

mod common;

use common::{page, settle, Item, Reply, ScriptedProvider, TestFixture};
use projsel::controller::PaginatedSearchController;
use projsel::session::{CurrentProject, FileSession, SessionError, SessionSink};
use std::sync::Arc;

#[test]
fn test_missing_file_means_no_selection() {
    let fixture = TestFixture::new();
    let session = FileSession::new(fixture.path().join("session.json"));

    assert!(session.current().unwrap().is_none());
}

#[test]
fn test_path_is_where_selection_lands() {
    let fixture = TestFixture::new();
    let session = FileSession::new(fixture.path().join("session.json"));

    session.record_selection(3, "Ops");

    assert_eq!(session.path(), fixture.path().join("session.json"));
    assert!(session.path().exists());
}

#[test]
fn test_record_selection_persists_project() {
    let fixture = TestFixture::new();
    let session = FileSession::new(fixture.path().join("nested/dir/session.json"));

    session.record_selection(42, "Mobile");

    let current = session.current().unwrap().unwrap();
    assert_eq!(current.current_project_id, 42);
    assert_eq!(current.current_project_name, "Mobile");
    assert!(fixture
        .read_file("nested/dir/session.json")
        .contains("\"current_project_name\": \"Mobile\""));
}

#[test]
fn test_later_selection_overwrites_earlier() {
    let fixture = TestFixture::new();
    let session = FileSession::new(fixture.path().join("session.json"));

    session.save(&CurrentProject::new(1, "First")).unwrap();
    session.record_selection(2, "Second");

    assert_eq!(session.current().unwrap().unwrap().current_project_id, 2);
}

#[test]
fn test_clear_forgets_selection() {
    let fixture = TestFixture::new();
    let session = FileSession::new(fixture.path().join("session.json"));

    session.record_selection(3, "Ops");
    session.clear().unwrap();

    assert!(session.current().unwrap().is_none());
    session.clear().unwrap();
}

#[test]
fn test_malformed_file_is_reported() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("session.json", "{not json");
    let session = FileSession::new(path);

    assert!(matches!(session.current(), Err(SessionError::Malformed(_))));
}

#[test]
fn test_unwritable_path_does_not_panic() {
    let fixture = TestFixture::new();
    // A regular file where a directory is expected.
    let blocker = fixture.create_file("blocker", "");
    let session = FileSession::new(blocker.join("session.json"));

    session.record_selection(1, "Nowhere");

    assert!(session.save(&CurrentProject::new(1, "Nowhere")).is_err());
}

#[tokio::test]
async fn test_controller_selection_reaches_file() {
    let fixture = TestFixture::new();
    let session = Arc::new(FileSession::new(fixture.path().join("session.json")));
    let provider = ScriptedProvider::new(vec![
        Reply::Page(vec![Item::new(9, "Design")]),
        Reply::Page(page(&[])),
    ]);
    let controller: PaginatedSearchController<Item> =
        PaginatedSearchController::new(provider, session.clone());

    controller.start();
    let state = settle(&controller).await;
    controller.select(&state.items()[0]);

    let current = session.current().unwrap().unwrap();
    assert_eq!(current.current_project_id, 9);
    assert_eq!(current.current_project_name, "Design");
}
