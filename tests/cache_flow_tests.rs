mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

use common::{header, json_body, TestApp, ADMIN_TOKEN};

#[tokio::test]
async fn test_trig_read_miss_then_hit() {
    let app = TestApp::new();

    let first = app.get("/v1/trigs/42").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-cache"), Some("MISS"));
    assert_eq!(header(&first, "x-cache-key"), Some("trig:42:v1"));
    assert!(header(&first, "x-cache-age").is_none());
    let first_body = json_body(first).await;

    let second = app.get("/v1/trigs/42").await;
    assert_eq!(header(&second, "x-cache"), Some("HIT"));
    let age: u64 = header(&second, "x-cache-age").unwrap().parse().unwrap();
    assert!(age <= 1);
    let ttl: u64 = header(&second, "x-cache-ttl").unwrap().parse().unwrap();
    assert!(ttl > 0 && ttl <= 86_400);
    assert_eq!(json_body(second).await, first_body);
}

#[tokio::test]
async fn test_log_creation_invalidates_dependent_reads() {
    let app = TestApp::new();

    assert_eq!(header(&app.get("/v1/trigs/42/logs").await, "x-cache"), Some("MISS"));
    assert_eq!(header(&app.get("/v1/trigs/42/logs").await, "x-cache"), Some("HIT"));
    app.get("/v1/trigs/99/logs").await;
    app.get("/v1/users/8").await;

    let created = app
        .send_json(
            "POST",
            "/v1/logs",
            json!({ "trig_id": 42, "user_id": 7, "condition": "G", "comment": "Still there", "score": 8 }),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created).await;
    assert_eq!(body["success"], true);
    assert!(body["invalidated"].as_u64().unwrap() >= 1);
    let new_id = body["data"]["id"].as_i64().unwrap();

    let after = app.get("/v1/trigs/42/logs").await;
    assert_eq!(header(&after, "x-cache"), Some("MISS"));
    let logs = json_body(after).await;
    assert_eq!(logs[0]["id"].as_i64(), Some(new_id));

    // Entradas sin relación sobreviven
    assert_eq!(header(&app.get("/v1/trigs/99/logs").await, "x-cache"), Some("HIT"));
    assert_eq!(header(&app.get("/v1/users/8").await, "x-cache"), Some("HIT"));
}

#[tokio::test]
async fn test_reordered_params_share_key() {
    let app = TestApp::new();

    let first = app.get("/v1/trigs?page=1&per_page=10").await;
    assert_eq!(header(&first, "x-cache"), Some("MISS"));
    let key = header(&first, "x-cache-key").unwrap().to_string();
    assert!(key.starts_with("trigs:list:params_"));

    let second = app.get("/v1/trigs?per_page=10&page=1").await;
    assert_eq!(header(&second, "x-cache"), Some("HIT"));
    assert_eq!(header(&second, "x-cache-key"), Some(key.as_str()));

    let other = app.get("/v1/trigs?per_page=20&page=1").await;
    assert_eq!(header(&other, "x-cache"), Some("MISS"));
    assert_ne!(header(&other, "x-cache-key"), Some(key.as_str()));
}

#[tokio::test]
async fn test_bypass_skips_store() {
    let app = TestApp::new();

    let request = Request::get("/v1/stats/site")
        .header("cache-control", "no-cache")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-cache"), Some("BYPASS"));
    assert_eq!(header(&response, "x-cache-key"), Some("stats:site:v1"));
    assert!(!app.store.contains("stats:site:v1").await);

    let request = Request::get("/v1/stats/site")
        .header("pragma", "no-cache")
        .body(Body::empty())
        .unwrap();
    assert_eq!(header(&app.send(request).await, "x-cache"), Some("BYPASS"));
}

#[tokio::test]
async fn test_not_found_is_not_cached() {
    let app = TestApp::new();

    let response = app.get("/v1/trigs/1234").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.store.keys().await.is_empty());
}

#[tokio::test]
async fn test_unavailable_store_degrades_silently() {
    let app = TestApp::new();
    app.store.set_available(false);

    let response = app.get("/v1/trigs/42").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-cache"), Some("MISS"));

    let created = app
        .send_json("POST", "/v1/logs", json!({ "trig_id": 42, "user_id": 7, "condition": "G" }))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(json_body(created).await["invalidated"], 0);
    assert_eq!(app.repository.log_count().await, 3);

    let health = json_body(app.get("/health").await).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cache"]["connected"], false);
}

#[tokio::test]
async fn test_user_rename_purges_embedded_listings() {
    let app = TestApp::new();

    app.get("/v1/trigs/42/logs").await;
    app.get("/v1/logs").await;
    app.get("/v1/trigs/42").await;

    let response = app
        .send_json("PATCH", "/v1/users/7", json!({ "name": "ian-renamed" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let logs = app.get("/v1/trigs/42/logs").await;
    assert_eq!(header(&logs, "x-cache"), Some("MISS"));
    assert_eq!(json_body(logs).await[0]["user_name"], "ian-renamed");
    assert_eq!(header(&app.get("/v1/logs").await, "x-cache"), Some("MISS"));
    assert_eq!(header(&app.get("/v1/trigs/42").await, "x-cache"), Some("HIT"));
}

#[tokio::test]
async fn test_photo_writes_invalidate_log_and_trig() {
    let app = TestApp::new();

    app.get("/v1/trigs/42/photos").await;
    app.get("/v1/logs/1").await;

    let created = app
        .send_json(
            "POST",
            "/v1/photos",
            json!({ "log_id": 1, "caption": "View", "url": "https://example.org/2.jpg" }),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let photos = app.get("/v1/trigs/42/photos").await;
    assert_eq!(header(&photos, "x-cache"), Some("MISS"));
    assert_eq!(json_body(photos).await.as_array().unwrap().len(), 2);
    assert_eq!(header(&app.get("/v1/logs/1").await, "x-cache"), Some("MISS"));
}

/// Estado `X-Cache` de cada lectura, en orden
async fn cache_states(app: &TestApp, uris: &[&str]) -> Vec<String> {
    let mut states = Vec::with_capacity(uris.len());
    for uri in uris {
        let response = app.get(uri).await;
        let state = header(&response, "x-cache").unwrap_or("-").to_string();
        states.push(format!("{} {}", uri, state));
    }
    states
}

fn expect(entries: &[(&str, &str)]) -> Vec<String> {
    entries.iter().map(|(uri, state)| format!("{} {}", uri, state)).collect()
}

#[tokio::test]
async fn test_log_update_invalidation_scope() {
    let app = TestApp::new();
    let reads = [
        "/v1/logs/1",
        "/v1/trigs/42/logs",
        "/v1/trigs",
        "/v1/users/7",
        "/v1/stats/site",
        "/v1/trigs/99/logs",
        "/v1/users/8",
    ];
    cache_states(&app, &reads).await;

    let response = app
        .send_json("PATCH", "/v1/logs/1", json!({ "comment": "Pillar repainted" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["invalidated"].as_u64().unwrap() >= 5);

    assert_eq!(
        cache_states(&app, &reads).await,
        expect(&[
            ("/v1/logs/1", "MISS"),
            ("/v1/trigs/42/logs", "MISS"),
            ("/v1/trigs", "MISS"),
            ("/v1/users/7", "MISS"),
            ("/v1/stats/site", "MISS"),
            ("/v1/trigs/99/logs", "HIT"),
            ("/v1/users/8", "HIT"),
        ])
    );
    let log = json_body(app.get("/v1/logs/1").await).await;
    assert_eq!(log["comment"], "Pillar repainted");
}

#[tokio::test]
async fn test_log_delete_also_purges_photo_reads() {
    let app = TestApp::new();
    let reads = [
        "/v1/trigs/42/photos",
        "/v1/trigs/42/logs",
        "/v1/users/7",
        "/v1/stats/site",
        "/v1/trigs/99",
        "/v1/trigs/99/logs",
        "/v1/users/8",
    ];
    cache_states(&app, &reads).await;
    app.get("/v1/logs/1").await;

    let response = app
        .send(Request::delete("/v1/logs/1").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        cache_states(&app, &reads).await,
        expect(&[
            ("/v1/trigs/42/photos", "MISS"),
            ("/v1/trigs/42/logs", "MISS"),
            ("/v1/users/7", "MISS"),
            ("/v1/stats/site", "MISS"),
            ("/v1/trigs/99", "HIT"),
            ("/v1/trigs/99/logs", "HIT"),
            ("/v1/users/8", "HIT"),
        ])
    );
    assert_eq!(app.get("/v1/logs/1").await.status(), StatusCode::NOT_FOUND);
    assert!(!app.store.contains("log:1:v1").await);
    let photos = json_body(app.get("/v1/trigs/42/photos").await).await;
    assert!(photos.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_photo_delete_invalidation_scope() {
    let app = TestApp::new();
    let reads = [
        "/v1/trigs/42/photos",
        "/v1/logs/1",
        "/v1/users/7",
        "/v1/stats/site",
        "/v1/trigs/99",
        "/v1/trigs/99/photos",
        "/v1/users/8",
        "/v1/logs",
    ];
    cache_states(&app, &reads).await;

    let response = app
        .send(Request::delete("/v1/photos/1").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        cache_states(&app, &reads).await,
        expect(&[
            ("/v1/trigs/42/photos", "MISS"),
            ("/v1/logs/1", "MISS"),
            ("/v1/users/7", "MISS"),
            ("/v1/stats/site", "MISS"),
            ("/v1/trigs/99", "HIT"),
            ("/v1/trigs/99/photos", "HIT"),
            ("/v1/users/8", "HIT"),
            ("/v1/logs", "HIT"),
        ])
    );
}

#[tokio::test]
async fn test_trig_update_invalidation_scope() {
    let app = TestApp::new();
    let reads = [
        "/v1/trigs/42",
        "/v1/trigs/42/logs",
        "/v1/trigs",
        "/v1/stats/site",
        "/v1/trigs/99",
        "/v1/users/7",
        "/v1/logs/1",
        "/v1/logs",
    ];
    cache_states(&app, &reads).await;

    let response = app
        .send_json("PATCH", "/v1/trigs/42", json!({ "name": "Black Down" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        cache_states(&app, &reads).await,
        expect(&[
            ("/v1/trigs/42", "MISS"),
            ("/v1/trigs/42/logs", "MISS"),
            ("/v1/trigs", "MISS"),
            ("/v1/stats/site", "MISS"),
            ("/v1/trigs/99", "HIT"),
            ("/v1/users/7", "HIT"),
            ("/v1/logs/1", "HIT"),
            ("/v1/logs", "HIT"),
        ])
    );
    assert_eq!(json_body(app.get("/v1/trigs/42").await).await["name"], "Black Down");
}

#[tokio::test]
async fn test_invalid_payload_rejected_without_invalidation() {
    let app = TestApp::new();
    app.get("/v1/trigs/42/logs").await;

    let response = app
        .send_json("POST", "/v1/logs", json!({ "trig_id": 42, "user_id": 7, "condition": "GOOD" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&app.get("/v1/trigs/42/logs").await, "x-cache"), Some("HIT"));
}

#[tokio::test]
async fn test_export_streams_and_is_never_cached() {
    let app = TestApp::new();

    let response = app.get("/v1/logs/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), Some("application/x-ndjson"));
    assert_eq!(header(&response, "x-cache"), Some("MISS"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 2);

    assert_eq!(header(&app.get("/v1/logs/export").await, "x-cache"), Some("MISS"));
    assert!(app.store.keys().await.is_empty());
}

#[tokio::test]
async fn test_disabled_cache_serves_without_headers_leaking_hits() {
    let app = TestApp::build(Some(ADMIN_TOKEN), false);

    assert_eq!(header(&app.get("/v1/trigs/42").await, "x-cache"), Some("MISS"));
    assert_eq!(header(&app.get("/v1/trigs/42").await, "x-cache"), Some("MISS"));

    let health = json_body(app.get("/health").await).await;
    assert_eq!(health["cache"]["backend"], "disabled");
}

fn admin_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_admin_requires_token() {
    let app = TestApp::new();

    let missing = app.send(admin_request("GET", "/v1/admin/cache/stats", None)).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .send(admin_request("GET", "/v1/admin/cache/stats", Some("nope")))
        .await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let closed = TestApp::build(None, true);
    let response = closed
        .send(admin_request("GET", "/v1/admin/cache/stats", Some(ADMIN_TOKEN)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_stats_and_flush() {
    let app = TestApp::new();
    app.get("/v1/trigs/42").await;
    app.get("/v1/trigs/99").await;
    app.get("/v1/users/7").await;

    let stats = app
        .send(admin_request("GET", "/v1/admin/cache/stats", Some(ADMIN_TOKEN)))
        .await;
    assert_eq!(stats.status(), StatusCode::OK);
    let stats = json_body(stats).await;
    assert_eq!(stats["data"]["backend"], "memory");
    assert_eq!(stats["data"]["key_count"], 3);

    let flushed = app
        .send(admin_request("DELETE", "/v1/admin/cache?pattern=trig:*", Some(ADMIN_TOKEN)))
        .await;
    assert_eq!(flushed.status(), StatusCode::OK);
    assert_eq!(json_body(flushed).await["data"]["deleted"], 2);
    assert_eq!(app.store.keys().await, vec!["user:7:v1"]);

    let flushed = app
        .send(admin_request("DELETE", "/v1/admin/cache", Some(ADMIN_TOKEN)))
        .await;
    assert_eq!(json_body(flushed).await["data"]["deleted"], 1);
    assert!(app.store.keys().await.is_empty());
}

#[tokio::test]
async fn test_admin_reports_unavailable_cache() {
    let disabled = TestApp::build(Some(ADMIN_TOKEN), false);
    let response = disabled
        .send(admin_request("GET", "/v1/admin/cache/stats", Some(ADMIN_TOKEN)))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let app = TestApp::new();
    app.store.set_available(false);
    let response = app
        .send(admin_request("DELETE", "/v1/admin/cache", Some(ADMIN_TOKEN)))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new();
    app.get("/v1/trigs/42").await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
}
