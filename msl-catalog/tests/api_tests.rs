//! Integration tests for msl-catalog API endpoints
//!
//! Tests drive the router in-process against an in-memory metadata
//! database and a temporary media directory.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use msl_catalog::store::{self, MediaStore};
use msl_catalog::{build_router, AppState};

const BASE_URL: &str = "http://localhost:3001";
const SECRET: &str = "test-signing-secret";
const BOUNDARY: &str = "msl-test-boundary";

/// Test helper: fresh app over in-memory database + tempdir media root.
/// The TempDir must stay alive for the duration of the test.
async fn setup_app() -> (axum::Router, tempfile::TempDir) {
    let pool = msl_common::db::init_memory_pool()
        .await
        .expect("Should open in-memory database");
    store::init_schema(&pool)
        .await
        .expect("Should create schema");

    let dir = tempfile::tempdir().expect("Should create tempdir");
    let media = MediaStore::open(dir.path().join("media")).expect("Should open media store");

    let state = AppState::new(pool, media, BASE_URL.to_string(), SECRET.to_string());
    (build_router(state), dir)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a single-file multipart upload request
fn upload_request(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/songs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "msl-catalog");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

// =============================================================================
// Listing and fetching
// =============================================================================

#[tokio::test]
async fn test_list_songs_empty() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get_request("/api/songs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_then_list_and_get() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(upload_request("track.mp3", "audio/mpeg", b"mp3-bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "track.mp3");
    assert_eq!(body["data"]["type"], "audio/mpeg");

    // List contains the uploaded song
    let response = app.clone().oneshot(get_request("/api/songs")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    let song = &body["data"][0];
    assert_eq!(song["id"], "track.mp3");
    assert_eq!(song["title"], "track");
    assert_eq!(song["url"], format!("{}/media/track.mp3", BASE_URL));

    // Single fetch
    let response = app.oneshot(get_request("/api/songs/track.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["title"], "track");
}

#[tokio::test]
async fn test_get_missing_song_is_404() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get_request("/api/songs/nope.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Upload validation
// =============================================================================

#[tokio::test]
async fn test_upload_rejects_non_audio() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(upload_request("notes.txt", "text/plain", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Only audio files"));
}

#[tokio::test]
async fn test_upload_without_file_is_400() {
    let (app, _dir) = setup_app().await;

    // Multipart body with a plain text field, no file part
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/songs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Stream URLs and the media route
// =============================================================================

#[tokio::test]
async fn test_stream_url_for_missing_song_is_404() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get_request("/api/songs/nope.mp3/stream-url"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_stream_url_round_trip() {
    let (app, _dir) = setup_app().await;

    app.clone()
        .oneshot(upload_request("track.mp3", "audio/mpeg", b"mp3-bytes"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/songs/track.mp3/stream-url"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["expiresIn"], 24 * 60 * 60);
    assert_eq!(body["songId"], "track.mp3");

    // Follow the signed URL through the media route
    let url = body["url"].as_str().unwrap();
    let path_and_query = url.strip_prefix(BASE_URL).unwrap();
    let response = app.oneshot(get_request(path_and_query)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "audio/mpeg"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"mp3-bytes");
}

#[tokio::test]
async fn test_media_route_rejects_bad_signature() {
    let (app, _dir) = setup_app().await;

    app.clone()
        .oneshot(upload_request("track.mp3", "audio/mpeg", b"mp3-bytes"))
        .await
        .unwrap();

    let expires = chrono::Utc::now().timestamp() + 600;
    let uri = format!(
        "/media/track.mp3?expires={}&sig={}",
        expires,
        "0".repeat(64)
    );
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_media_route_rejects_expired_url() {
    let (app, _dir) = setup_app().await;

    app.clone()
        .oneshot(upload_request("track.mp3", "audio/mpeg", b"mp3-bytes"))
        .await
        .unwrap();

    // Valid signature over an expiry in the past
    let expires = chrono::Utc::now().timestamp() - 60;
    let sig = msl_common::signing::sign("track.mp3", expires, SECRET);
    let uri = format!("/media/track.mp3?expires={}&sig={}", expires, sig);

    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_song() {
    let (app, _dir) = setup_app().await;

    app.clone()
        .oneshot(upload_request("track.mp3", "audio/mpeg", b"mp3-bytes"))
        .await
        .unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/songs/track.mp3")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/api/songs/track.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_song_is_404() {
    let (app, _dir) = setup_app().await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/songs/nope.mp3")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
