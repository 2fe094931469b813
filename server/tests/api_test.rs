//! Integration tests for the HTTP API together with the folder watcher.
//!
//! These tests wire the router to a real [`TodoWatcher`] on a temporary
//! folder, the same way `todo-watcher serve` does, and drive it through
//! `tower::ServiceExt::oneshot`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use serial_test::serial;
use tempfile::TempDir;
use tokio::time::timeout;
use tower::ServiceExt;

use todo_watcher_server::broadcast::{ChangeBroadcaster, ChangeOp};
use todo_watcher_server::config::Config;
use todo_watcher_server::routes::{create_router, AppState};
use todo_watcher_server::watcher::TodoWatcher;

// ============================================================================
// Helper Functions
// ============================================================================

fn config_for(dir: &Path) -> Config {
    Config {
        todo_folder: dir.to_path_buf(),
        host: "127.0.0.1".to_string(),
        port: 0,
        editor: "true".to_string(),
        tab_width: 4,
    }
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
#[serial]
async fn change_notice_then_fresh_parse() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("240515-today.txt");
    fs::write(&file, "Groceries:\n\tMilk\n").unwrap();

    let broadcaster = ChangeBroadcaster::new();
    let mut notices = broadcaster.subscribe();
    let _watcher = TodoWatcher::new(dir.path().to_path_buf(), broadcaster.clone()).unwrap();
    let app = create_router(AppState::with_broadcaster(config_for(dir.path()), broadcaster));

    let (status, body) = get_json(&app, "/api/todos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["subtasks"][0]["content"], "Groceries");
    assert_eq!(body[0]["subtasks"][0]["status"], 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(&file, "Groceries:\n\tx Milk\n\tBread\n").unwrap();

    let notice = timeout(Duration::from_secs(5), notices.recv())
        .await
        .expect("timed out waiting for change notice")
        .unwrap();
    assert!(notice.path.ends_with("240515-today.txt"));
    assert!(matches!(notice.op, ChangeOp::Write | ChangeOp::Create));

    // The first notice can arrive while the write is still in progress.
    let mut body = Value::Null;
    for _ in 0..50 {
        body = get_json(&app, "/api/todos").await.1;
        if body[0]["subtasks"][0]["subtasks"].as_array().map(Vec::len) == Some(2) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let groceries = &body[0]["subtasks"][0];
    assert_eq!(groceries["status"], 1);
    assert_eq!(
        groceries["subtasks"],
        json!([
            { "status": 2, "content": "Milk" },
            { "status": 0, "content": "Bread" }
        ])
    );
}

#[tokio::test]
#[serial]
async fn unreadable_file_does_not_fail_the_request() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "Keep me\n").unwrap();
    fs::write(dir.path().join("b.bin"), [0xff, 0xfe, 0x00, b'\n']).unwrap();
    let app = create_router(AppState::new(config_for(dir.path())));

    let (status, body) = get_json(&app, "/api/todos").await;
    assert_eq!(status, StatusCode::OK);
    let roots = body.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["subtasks"][0]["content"], "Keep me");
}

#[tokio::test]
#[serial]
async fn done_section_round_trips_through_api() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("list.txt"),
        "! Release\n\t. Notes?\n--- Done Today\nShip it\n",
    )
    .unwrap();
    let app = create_router(AppState::new(config_for(dir.path())));

    let (_, body) = get_json(&app, "/api/todos").await;
    assert_eq!(
        body[0]["subtasks"],
        json!([
            {
                "status": 0,
                "content": "Release",
                "priority": 1,
                "subtasks": [
                    { "status": 0, "content": "Notes", "priority": 1, "tentative": true }
                ]
            },
            {
                "status": 2,
                "content": "Done Today",
                "subtasks": [ { "status": 2, "content": "Ship it" } ]
            }
        ])
    );
}

#[tokio::test]
#[serial]
async fn health_counts_subscribers() {
    let dir = TempDir::new().unwrap();
    let broadcaster = ChangeBroadcaster::new();
    let _a = broadcaster.subscribe();
    let _b = broadcaster.subscribe();
    let app = create_router(AppState::with_broadcaster(config_for(dir.path()), broadcaster));

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 2);
}
