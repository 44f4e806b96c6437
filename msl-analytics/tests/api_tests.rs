//! Integration tests for msl-analytics API endpoints
//!
//! Events are seeded through the tracking endpoints themselves (the
//! request body accepts an explicit timestamp), then the aggregation
//! endpoints are asserted against the seeded window.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use msl_analytics::{build_router, db, AppState};

async fn setup_app() -> axum::Router {
    let pool = msl_common::db::init_memory_pool()
        .await
        .expect("Should open in-memory database");
    db::init_schema(&pool).await.expect("Should create schema");
    build_router(AppState::new(pool))
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Seed one play through the tracking endpoint
async fn track_play(app: &axum::Router, song_id: &str, user_id: Option<&str>, duration: i64, timestamp: Option<String>) {
    let mut body = json!({"songId": song_id, "duration": duration});
    if let Some(user_id) = user_id {
        body["userId"] = json!(user_id);
    }
    if let Some(timestamp) = timestamp {
        body["timestamp"] = json!(timestamp);
    }
    let response = app
        .clone()
        .oneshot(post_json("/api/analytics/plays", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "msl-analytics");
}

// =============================================================================
// Play tracking
// =============================================================================

#[tokio::test]
async fn test_track_play_returns_play_id() {
    let app = setup_app().await;

    let response = app
        .oneshot(post_json(
            "/api/analytics/plays",
            json!({"songId": "a.mp3", "userId": "u1", "duration": 120}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert!(body["playId"].is_string());
    assert_eq!(body["message"], "Play tracked successfully");
}

#[tokio::test]
async fn test_track_play_without_song_id_is_400() {
    let app = setup_app().await;

    let response = app
        .oneshot(post_json("/api/analytics/plays", json!({"userId": "u1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("songId"));
}

#[tokio::test]
async fn test_track_play_with_invalid_timestamp_is_400() {
    let app = setup_app().await;

    let response = app
        .oneshot(post_json(
            "/api/analytics/plays",
            json!({"songId": "a.mp3", "timestamp": "yesterday"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Song analytics
// =============================================================================

#[tokio::test]
async fn test_song_analytics_counters_and_window() {
    let app = setup_app().await;

    track_play(&app, "a.mp3", Some("u1"), 100, None).await;
    track_play(&app, "a.mp3", Some("u2"), 200, None).await;
    track_play(&app, "a.mp3", Some("u1"), 50, Some(days_ago(10))).await;

    // Default 7d window: two recent plays; lifetime counter sees three
    let response = app
        .clone()
        .oneshot(get_request("/api/analytics/songs/a.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["songId"], "a.mp3");
    assert_eq!(body["period"], "7d");
    assert_eq!(body["playCount"], 2);
    assert_eq!(body["periodPlays"], 2);
    assert_eq!(body["uniqueListeners"], 2);
    assert_eq!(body["totalDuration"], 300);
    assert_eq!(body["averageDuration"], 150);
    assert_eq!(body["totalPlays"], 3);
    assert!(body["lastPlayed"].is_string());

    // All-time window
    let response = app
        .oneshot(get_request("/api/analytics/songs/a.mp3?period=all"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["playCount"], 3);
    assert_eq!(body["totalDuration"], 350);
}

#[tokio::test]
async fn test_song_analytics_for_unplayed_song_is_zeroed() {
    let app = setup_app().await;

    let response = app
        .oneshot(get_request("/api/analytics/songs/nothing.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["playCount"], 0);
    assert_eq!(body["totalPlays"], 0);
    assert!(body.get("lastPlayed").is_none());
}

// =============================================================================
// Trending
// =============================================================================

#[tokio::test]
async fn test_trending_sorted_descending_within_window() {
    let app = setup_app().await;

    // b: 3 recent plays, a: 2, c: 1; d: many but outside the 24h window
    for _ in 0..3 {
        track_play(&app, "b.mp3", Some("u1"), 60, None).await;
    }
    for _ in 0..2 {
        track_play(&app, "a.mp3", Some("u1"), 30, None).await;
    }
    track_play(&app, "c.mp3", Some("u1"), 10, None).await;
    for _ in 0..5 {
        track_play(&app, "d.mp3", Some("u1"), 10, Some(days_ago(2))).await;
    }

    let response = app
        .oneshot(get_request("/api/analytics/trending?period=24h"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["period"], "24h");
    assert!(body["generatedAt"].is_string());

    let trending = body["trending"].as_array().unwrap();
    assert_eq!(trending.len(), 3);
    assert_eq!(trending[0]["songId"], "b.mp3");
    assert_eq!(trending[0]["playCount"], 3);
    assert_eq!(trending[0]["averageDuration"], 60);
    assert_eq!(trending[1]["songId"], "a.mp3");
    assert_eq!(trending[2]["songId"], "c.mp3");

    // Play counts strictly descending
    let counts: Vec<i64> = trending
        .iter()
        .map(|t| t["playCount"].as_i64().unwrap())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_trending_respects_limit() {
    let app = setup_app().await;

    for song in ["a.mp3", "b.mp3", "c.mp3"] {
        track_play(&app, song, None, 10, None).await;
    }

    let response = app
        .oneshot(get_request("/api/analytics/trending?limit=2"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["trending"].as_array().unwrap().len(), 2);
}

// =============================================================================
// User history
// =============================================================================

#[tokio::test]
async fn test_user_history_pagination() {
    let app = setup_app().await;

    for i in 0..5i64 {
        track_play(
            &app,
            &format!("song-{}.mp3", i),
            Some("u1"),
            30,
            Some(days_ago(i)),
        )
        .await;
    }
    track_play(&app, "other.mp3", Some("u2"), 30, None).await;

    let response = app
        .oneshot(get_request(
            "/api/analytics/users/u1/history?limit=2&offset=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["limit"], 2);
    assert_eq!(body["pagination"]["offset"], 1);

    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    // Newest first, offset skips the most recent (song-0)
    assert_eq!(history[0]["songId"], "song-1.mp3");
    assert_eq!(history[1]["songId"], "song-2.mp3");
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_recommendations_exclude_played_songs() {
    let app = setup_app().await;

    // Platform trending: a, b, c
    for song in ["a.mp3", "b.mp3", "c.mp3"] {
        track_play(&app, song, Some("other-user"), 30, None).await;
    }
    // u1 already played a.mp3
    track_play(&app, "a.mp3", Some("u1"), 30, None).await;

    let response = app
        .oneshot(get_request("/api/analytics/users/u1/recommendations"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let songs: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["songId"].as_str().unwrap())
        .collect();
    assert!(!songs.contains(&"a.mp3"));
    assert!(songs.contains(&"b.mp3"));
    assert!(songs.contains(&"c.mp3"));
}

#[tokio::test]
async fn test_recommendations_fall_back_to_trending_without_history() {
    let app = setup_app().await;

    for song in ["a.mp3", "b.mp3"] {
        track_play(&app, song, Some("other-user"), 30, None).await;
    }

    let response = app
        .oneshot(get_request("/api/analytics/users/newcomer/recommendations"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Insights
// =============================================================================

#[tokio::test]
async fn test_user_insights_buckets_and_activity() {
    let app = setup_app().await;

    // Fixed wall-clock hours on a recent day (inside the 30d window)
    let day = (Utc::now() - Duration::days(2)).date_naive();
    let at = |hour: u32| {
        Utc.from_utc_datetime(&day.and_hms_opt(hour, 30, 0).unwrap())
            .to_rfc3339()
    };

    track_play(&app, "a.mp3", Some("u1"), 60, Some(at(6))).await; // morning
    track_play(&app, "a.mp3", Some("u1"), 60, Some(at(13))).await; // afternoon
    track_play(&app, "b.mp3", Some("u1"), 30, Some(at(18))).await; // evening
    track_play(&app, "b.mp3", Some("u1"), 30, Some(at(23))).await; // night
    track_play(&app, "b.mp3", Some("u1"), 30, Some(at(2))).await; // night

    // Engagement inside the window
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/analytics/engagement",
            json!({"userId": "u1", "type": "like", "targetId": "a.mp3"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get_request("/api/analytics/users/u1/insights"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["period"], "30d");
    assert_eq!(body["totalPlays"], 5);
    assert_eq!(body["totalPlayTime"], 210);
    assert_eq!(body["averagePlayTime"], 42);
    assert_eq!(body["activityLevel"], "inactive");

    let buckets = &body["listeningPatterns"]["timeOfDay"];
    assert_eq!(buckets["morning"], 1);
    assert_eq!(buckets["afternoon"], 1);
    assert_eq!(buckets["evening"], 1);
    assert_eq!(buckets["night"], 2);
    assert_eq!(body["listeningPatterns"]["favoriteTime"], "night");

    let top = body["topSongs"].as_array().unwrap();
    assert_eq!(top[0]["songId"], "b.mp3");
    assert_eq!(top[0]["plays"], 3);

    assert_eq!(body["engagement"]["like"], 1);
}

// =============================================================================
// Platform and dashboard
// =============================================================================

#[tokio::test]
async fn test_platform_analytics() {
    let app = setup_app().await;

    track_play(&app, "a.mp3", Some("u1"), 100, None).await;
    track_play(&app, "a.mp3", Some("u2"), 100, None).await;
    track_play(&app, "b.mp3", None, 100, None).await; // anonymous

    let response = app
        .oneshot(get_request("/api/analytics/platform"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["period"], "7d");
    assert_eq!(body["totalPlays"], 3);
    assert_eq!(body["uniqueUsers"], 2);
    assert_eq!(body["totalDuration"], 300);
    assert_eq!(body["averageSessionDuration"], 100);
    assert_eq!(body["popularSongs"][0]["songId"], "a.mp3");
}

#[tokio::test]
async fn test_dashboard_combines_views() {
    let app = setup_app().await;

    track_play(&app, "a.mp3", Some("u1"), 100, None).await;

    let response = app
        .oneshot(get_request("/api/analytics/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["period"], "7d");
    assert_eq!(body["platform"]["totalPlays"], 1);
    assert_eq!(body["trending"].as_array().unwrap().len(), 1);
    assert_eq!(body["recentActivity"].as_array().unwrap().len(), 1);
    assert!(body["generatedAt"].is_string());
}

// =============================================================================
// Engagement
// =============================================================================

#[tokio::test]
async fn test_engagement_validation() {
    let app = setup_app().await;

    // Missing type
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/analytics/engagement",
            json!({"userId": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown type
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/analytics/engagement",
            json!({"userId": "u1", "type": "poke"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid
    let response = app
        .oneshot(post_json(
            "/api/analytics/engagement",
            json!({"userId": "u1", "type": "share", "targetId": "a.mp3"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
}
