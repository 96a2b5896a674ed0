//! Integration tests for the Quire Server API

use axum::http::StatusCode;
use axum_test::TestServer;
use quire_core::remote::{decode_content, encode_content, LocalContentStore};
use quire_server::routes::create_router;
use quire_server::state::{AppState, ServerEvent};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Create a test server over temporary storage
fn create_test_server() -> (TestServer, AppState, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = AppState::with_root(temp_dir.path(), "books.json");
    let server =
        TestServer::new(create_router(state.clone())).expect("Failed to create test server");
    (server, state, temp_dir)
}

async fn put_file(server: &TestServer, path: &str, content: &[u8], sha: Option<&str>) -> Value {
    let mut body = json!({
        "message": format!("write {}", path),
        "content": encode_content(content),
    });
    if let Some(sha) = sha {
        body["sha"] = json!(sha);
    }
    let response = server
        .put(&format!("/api/v1/contents/{}", path))
        .json(&body)
        .await;
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_get_missing_file() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/api/v1/contents/books/missing.json").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_create_then_read() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server
        .put("/api/v1/contents/books/a.json")
        .json(&json!({"message": "Publish A", "content": encode_content(b"{\"title\":\"A\"}")}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let written: Value = response.json();
    assert_eq!(written["content"]["path"], "books/a.json");
    let sha = written["content"]["sha"].as_str().unwrap().to_string();
    assert_eq!(sha, LocalContentStore::token_for(b"{\"title\":\"A\"}").as_str());

    let response = server.get("/api/v1/contents/books/a.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["sha"], sha.as_str());
    assert_eq!(body["encoding"], "base64");
    assert_eq!(
        decode_content(body["content"].as_str().unwrap()).unwrap(),
        b"{\"title\":\"A\"}"
    );
}

#[tokio::test]
async fn test_update_requires_current_sha() {
    let (server, _state, _temp_dir) = create_test_server();
    let created = put_file(&server, "a.txt", b"one", None).await;
    let first_sha = created["content"]["sha"].as_str().unwrap().to_string();

    // Creating over an existing file
    let response = server
        .put("/api/v1/contents/a.txt")
        .json(&json!({"message": "again", "content": encode_content(b"two")}))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = server
        .put("/api/v1/contents/a.txt")
        .json(&json!({"message": "update", "content": encode_content(b"two"), "sha": first_sha}))
        .await;
    response.assert_status_ok();

    // The first token is stale now
    let response = server
        .put("/api/v1/contents/a.txt")
        .json(&json!({"message": "late", "content": encode_content(b"three"), "sha": first_sha}))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: Value = server.get("/api/v1/contents/a.txt").await.json();
    assert_eq!(decode_content(body["content"].as_str().unwrap()).unwrap(), b"two");
}

#[tokio::test]
async fn test_update_of_missing_file_conflicts() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server
        .put("/api/v1/contents/ghost.txt")
        .json(&json!({"message": "m", "content": encode_content(b"x"), "sha": "abc123"}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_base64_is_rejected() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server
        .put("/api/v1/contents/a.txt")
        .json(&json!({"message": "m", "content": "not base64!"}))
        .await;

    response.assert_status_bad_request();
    server
        .get("/api/v1/contents/a.txt")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_library_document() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/library.json").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "[]");
    assert_eq!(response.header("cache-control"), "no-store");

    let catalog = br#"[{"path": "books/a.json", "title": "A"}]"#;
    put_file(&server, "books.json", catalog, None).await;

    let response = server.get("/library.json").await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), catalog.as_slice());
}

#[tokio::test]
async fn test_writes_are_broadcast() {
    let (server, state, _temp_dir) = create_test_server();
    let mut rx = state.subscribe();

    let written = put_file(&server, "books/a.json", b"{}", None).await;

    let event = rx.recv().await.unwrap();
    assert_eq!(
        event,
        ServerEvent::FileUpdated {
            path: "books/a.json".to_string(),
            sha: written["content"]["sha"].as_str().unwrap().to_string(),
        }
    );
}

#[tokio::test]
async fn test_files_persist_on_disk() {
    let (server, _state, temp_dir) = create_test_server();

    put_file(&server, "books/a.json", b"{\"id\":\"a\"}", None).await;

    let on_disk = std::fs::read(temp_dir.path().join("books").join("a.json")).unwrap();
    assert_eq!(on_disk, b"{\"id\":\"a\"}");
}
