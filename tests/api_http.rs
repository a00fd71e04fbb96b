// tests/api_http.rs
//
// HTTP-level tests for the card-serving Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::{Arc, RwLock};

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use roster_activity_alerter::api::{create_router, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router(tmp: &tempfile::TempDir) -> Router {
    let cards_dir = tmp.path().join("cards");
    std::fs::create_dir_all(&cards_dir).unwrap();
    create_router(AppState {
        cards_dir,
        latest_path: tmp.path().join("out_add.png"),
        last_new: Arc::new(RwLock::new(Vec::new())),
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_returns_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, bytes) = get(test_router(&tmp), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap(), "ok");
}

#[tokio::test]
async fn missing_card_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, _) = get(test_router(&tmp), "/cards/0123456789ab.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_hex_card_names_are_404_not_file_lookups() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, _) = get(test_router(&tmp), "/cards/zz.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(test_router(&tmp), "/cards/readme.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn existing_card_is_served_as_png() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&tmp);

    let payload = b"\x89PNG fake bytes".to_vec();
    std::fs::write(tmp.path().join("cards/0123456789ab.png"), &payload).unwrap();

    let req = Request::builder()
        .uri("/cards/0123456789ab.png")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(bytes.to_vec(), payload);
}

#[tokio::test]
async fn latest_alias_is_best_effort() {
    let tmp = tempfile::tempdir().unwrap();

    let (status, _) = get(test_router(&tmp), "/cards/latest.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    std::fs::write(tmp.path().join("out_add.png"), b"latest").unwrap();
    let (status, bytes) = get(test_router(&tmp), "/cards/latest.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"latest");
}

#[tokio::test]
async fn last_is_empty_json_array_before_first_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, bytes) = get(test_router(&tmp), "/last").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, serde_json::json!([]));
}
