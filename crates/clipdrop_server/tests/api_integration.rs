//! Integration tests for the ClipDrop HTTP API.

mod support;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use support::{setup_test_server, setup_test_server_with_secret};

async fn create(server: &TestServer, body: Value) -> String {
    let response = server.post("/api/clipboard").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    created["key"].as_str().expect("key").to_string()
}

#[tokio::test]
async fn test_item_lifecycle_with_case_insensitive_keys() {
    let (server, _temp) = setup_test_server();

    let key = create(&server, json!({ "content": "hello world" })).await;

    let response = server
        .get(&format!("/api/clipboard/{}", key.to_ascii_uppercase()))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "status": "content", "content": "hello world", "view_count": 1 })
    );

    let second: Value = server
        .get(&format!("/api/clipboard/{}", key.to_ascii_lowercase()))
        .await
        .json();
    assert_eq!(second["view_count"], 2);

    let delete = server
        .delete(&format!("/api/clipboard/{}", key.to_ascii_lowercase()))
        .await;
    assert_eq!(delete.status_code(), StatusCode::OK);
    assert_eq!(delete.json::<Value>(), json!({ "success": true }));

    let gone = server.get(&format!("/api/clipboard/{}", key)).await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(gone.json::<Value>()["error"], "Not found");

    let again = server.delete(&format!("/api/clipboard/{}", key)).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_outcomes() {
    let (server, _temp) = setup_test_server();
    let key = create(&server, json!({ "content": "secret", "password": "Open-Sesame" })).await;
    let path = format!("/api/clipboard/{}", key);

    let probe: Value = server
        .get(&format!("/api/clipboard/{}/protected", key))
        .await
        .json();
    assert_eq!(probe, json!({ "password_required": true }));

    let required = server.get(&path).await;
    assert_eq!(required.status_code(), StatusCode::OK);
    assert_eq!(
        required.json::<Value>(),
        json!({ "status": "password_required" })
    );

    let wrong = server.get(&path).add_query_param("pwd", "open-sesame").await;
    assert_eq!(wrong.status_code(), StatusCode::OK);
    assert_eq!(
        wrong.json::<Value>(),
        json!({ "status": "password_incorrect" })
    );

    let right: Value = server
        .get(&path)
        .add_query_param("pwd", "Open-Sesame")
        .await
        .json();
    assert_eq!(right["status"], "content");
    assert_eq!(right["content"], "secret");
    // Failed attempts do not count as views.
    assert_eq!(right["view_count"], 1);
}

#[tokio::test]
async fn test_protected_probe_for_open_and_missing_items() {
    let (server, _temp) = setup_test_server();
    let key = create(&server, json!({ "content": "open", "password": "" })).await;

    let open: Value = server
        .get(&format!("/api/clipboard/{}/protected", key))
        .await
        .json();
    assert_eq!(open, json!({ "password_required": false }));

    let missing = server.get("/api/clipboard/zzzzzz/protected").await;
    assert_eq!(missing.status_code(), StatusCode::OK);
    assert_eq!(
        missing.json::<Value>(),
        json!({ "password_required": false })
    );

    // Probing never counts as a view.
    let read: Value = server.get(&format!("/api/clipboard/{}", key)).await.json();
    assert_eq!(read["view_count"], 1);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let (server, _temp) = setup_test_server();

    let blank = server
        .post("/api/clipboard")
        .json(&json!({ "content": "   " }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    let oversized = server
        .post("/api/clipboard")
        .json(&json!({ "content": "x".repeat(10_001) }))
        .await;
    assert_eq!(oversized.status_code(), StatusCode::BAD_REQUEST);
    let message = oversized.json::<Value>()["error"]
        .as_str()
        .expect("error message")
        .to_string();
    assert!(message.contains("10000"), "message: {}", message);

    let past = server
        .post("/api/clipboard")
        .json(&json!({
            "content": "late",
            "expires_at": (Utc::now() - Duration::minutes(1)).to_rfc3339(),
        }))
        .await;
    assert_eq!(past.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        past.json::<Value>()["error"],
        "Expiry must be in the future"
    );

    let far = server
        .post("/api/clipboard")
        .json(&json!({
            "content": "early",
            "expires_at": (Utc::now() + Duration::days(31)).to_rfc3339(),
        }))
        .await;
    assert_eq!(far.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        far.json::<Value>()["error"],
        "Expiry must be within 30 days"
    );
}

#[tokio::test]
async fn test_malformed_create_bodies_are_bad_requests() {
    let (server, _temp) = setup_test_server();

    for body in [json!({}), json!({ "content": 5 })] {
        let response = server.post("/api/clipboard").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(
            response.json::<Value>()["error"],
            "Invalid content: content is required"
        );
    }

    let bad_expiry = server
        .post("/api/clipboard")
        .json(&json!({ "content": "soon", "expires_at": "next tuesday" }))
        .await;
    assert_eq!(bad_expiry.status_code(), StatusCode::BAD_REQUEST);
    let message = bad_expiry.json::<Value>()["error"]
        .as_str()
        .expect("error message")
        .to_string();
    assert!(message.starts_with("Invalid request body"), "message: {}", message);

    let not_json = server
        .post("/api/clipboard")
        .text("{content:")
        .content_type("application/json")
        .await;
    assert_eq!(not_json.status_code(), StatusCode::BAD_REQUEST);
    assert!(not_json.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_content_at_limit_is_accepted() {
    let (server, _temp) = setup_test_server();
    let content = "ü".repeat(10_000);
    let key = create(&server, json!({ "content": content })).await;

    let body: Value = server.get(&format!("/api/clipboard/{}", key)).await.json();
    assert_eq!(body["content"], content);
}

#[tokio::test]
async fn test_request_body_limit() {
    let (server, _temp) = setup_test_server();
    let response = server
        .post("/api/clipboard")
        .json(&json!({ "content": "x".repeat(200_000) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_lazy_expiry_and_cleanup() {
    let (server, _temp) = setup_test_server();
    let short = create(
        &server,
        json!({
            "content": "brief",
            "expires_at": (Utc::now() + Duration::milliseconds(300)).to_rfc3339(),
        }),
    )
    .await;
    let long = create(&server, json!({ "content": "stays" })).await;

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;

    let expired = server.get(&format!("/api/clipboard/{}", short)).await;
    assert_eq!(expired.status_code(), StatusCode::NOT_FOUND);

    let cleanup = server.post("/api/cleanup").await;
    assert_eq!(cleanup.status_code(), StatusCode::OK);
    let body: Value = cleanup.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted_count"], 1);

    let repeat: Value = server.get("/api/cleanup").await.json();
    assert_eq!(repeat["deleted_count"], 0);

    let live = server.get(&format!("/api/clipboard/{}", long)).await;
    assert_eq!(live.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_cleanup_requires_configured_secret() {
    let (server, _temp) = setup_test_server_with_secret(Some("cron-s3cret"));

    let missing = server.post("/api/cleanup").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json::<Value>()["error"], "Unauthorized");

    let wrong = server
        .post("/api/cleanup")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer nope"),
        )
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let padded = server
        .post("/api/cleanup")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer  cron-s3cret"),
        )
        .await;
    assert_eq!(padded.status_code(), StatusCode::UNAUTHORIZED);

    let right = server
        .get("/api/cleanup")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer cron-s3cret"),
        )
        .await;
    assert_eq!(right.status_code(), StatusCode::OK);
    assert_eq!(right.json::<Value>()["deleted_count"], 0);
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let (server, _temp) = setup_test_server();

    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
    response.assert_header("cache-control", "no-store");
    response.assert_contains_header("content-security-policy");
}

#[tokio::test]
async fn test_unknown_key_is_not_found() {
    let (server, _temp) = setup_test_server();
    let response = server.get("/api/clipboard/nokey").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
