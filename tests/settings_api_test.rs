// Router-level tests for /settings.
//
// Requests go through the full application router (auth middleware, body
// limit, handlers) via tower::ServiceExt::oneshot, backed by an in-memory store.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{
    basic, body_bytes, body_json, send, test_app, TestApp, SECRETS_PEPPER, SETTINGS_PEPPER,
};
use settings_sync::hasher::{derive, Pepper};

const OCTET: &str = "application/octet-stream";

async fn app_with_user(max_bytes: usize) -> TestApp {
    let app = test_app("http://127.0.0.1:9", max_bytes);
    app.identities.set("42", "s1").await.unwrap();
    app
}

fn request(method: &str, auth: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri("/settings");
    match auth {
        Some(value) => builder.header("authorization", value),
        None => builder,
    }
}

fn put(auth: &str, content_type: &str, body: Vec<u8>) -> Request<Body> {
    request("PUT", Some(auth))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

fn empty(method: &str, auth: Option<&str>) -> Request<Body> {
    request(method, auth).body(Body::empty()).unwrap()
}

// ── Authentication gate ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_every_method_requires_auth() {
    let app = app_with_user(1024).await;

    for method in ["GET", "HEAD", "DELETE"] {
        let resp = send(&app.router, empty(method, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", method);
    }

    let resp = send(
        &app.router,
        request("PUT", None)
            .header(header::CONTENT_TYPE, OCTET)
            .body(Body::from(vec![1, 2, 3]))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(app.kv.keys().iter().all(|k| !k.starts_with("settings:")));
}

#[tokio::test]
async fn test_missing_malformed_invalid_share_status() {
    let app = app_with_user(1024).await;

    let missing = send(&app.router, empty("GET", None)).await;
    let malformed = send(&app.router, empty("GET", Some("%%%not-base64"))).await;
    let invalid = send(&app.router, empty("GET", Some(&basic("42", "s2")))).await;
    let unknown = send(&app.router, empty("GET", Some(&basic("43", "s1")))).await;

    for resp in [missing, malformed, invalid, unknown] {
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().starts_with("Unauthorized"));
    }
}

// ── Read / peek ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_missing_returns_404_json() {
    let app = app_with_user(1024).await;
    let resp = send(&app.router, empty("GET", Some(&basic("42", "s1")))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_head_missing_returns_404() {
    let app = app_with_user(1024).await;
    let resp = send(&app.router, empty("HEAD", Some(&basic("42", "s1")))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().get(header::ETAG).is_none());
}

#[tokio::test]
async fn test_write_then_read_consistent() {
    let app = app_with_user(1024).await;
    let auth = basic("42", "s1");
    let payload = vec![0u8, 1, 2, 3, 254, 255];

    let resp = send(&app.router, put(&auth, OCTET, payload.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let written = body_json(resp).await["written"].as_i64().unwrap();

    let resp = send(&app.router, empty("GET", Some(&auth))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ETAG], written.to_string());
    assert_eq!(resp.headers()[header::CONTENT_TYPE], OCTET);
    assert_eq!(body_bytes(resp).await, payload);

    let resp = send(&app.router, empty("HEAD", Some(&auth))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ETAG], written.to_string());
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn test_conditional_get_not_modified() {
    let app = app_with_user(1024).await;
    let auth = basic("42", "s1");

    let resp = send(&app.router, put(&auth, OCTET, vec![5; 5])).await;
    let written = body_json(resp).await["written"].as_i64().unwrap();

    let resp = send(
        &app.router,
        request("GET", Some(&auth))
            .header(header::IF_NONE_MATCH, written.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(
        &app.router,
        request("GET", Some(&auth))
            .header(header::IF_NONE_MATCH, (written - 1).to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, vec![5; 5]);
}

// ── Write validation ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_put_wrong_content_type_returns_415() {
    let app = app_with_user(1024).await;
    let auth = basic("42", "s1");

    let resp = send(&app.router, put(&auth, "application/json", b"{}".to_vec())).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(resp).await["error"].is_string());

    let resp = send(
        &app.router,
        request("PUT", Some(&auth))
            .body(Body::from(vec![1, 2, 3]))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_put_at_exact_limit_is_allowed() {
    let app = app_with_user(100).await;
    let resp = send(&app.router, put(&basic("42", "s1"), OCTET, vec![b'x'; 100])).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_put_one_byte_over_limit_returns_413() {
    let app = app_with_user(100).await;
    let resp = send(&app.router, put(&basic("42", "s1"), OCTET, vec![b'x'; 101])).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("100"));
}

#[tokio::test]
async fn test_put_far_over_limit_returns_413() {
    let app = app_with_user(100).await;
    let resp = send(&app.router, put(&basic("42", "s1"), OCTET, vec![b'x'; 10_000])).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(resp).await["error"].is_string());
}

// ── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app_with_user(1024).await;
    let auth = basic("42", "s1");

    send(&app.router, put(&auth, OCTET, vec![1; 3])).await;

    let resp = send(&app.router, empty("DELETE", Some(&auth))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app.router, empty("GET", Some(&auth))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app.router, empty("DELETE", Some(&auth))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// ── Isolation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_users_cannot_see_each_other() {
    let app = app_with_user(1024).await;
    app.identities.set("43", "other").await.unwrap();

    send(&app.router, put(&basic("42", "s1"), OCTET, vec![4; 4])).await;

    let resp = send(&app.router, empty("GET", Some(&basic("43", "other")))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_persisted_layout_uses_two_namespaces() {
    let app = app_with_user(1024).await;
    send(&app.router, put(&basic("42", "s1"), OCTET, vec![4; 4])).await;

    let mut keys = app.kv.keys();
    keys.sort();
    assert_eq!(keys.len(), 2);
    assert!(keys[0].starts_with("secrets:"));
    assert!(keys[1].starts_with("settings:"));

    let secrets_hash = keys[0].trim_start_matches("secrets:");
    let settings_hash = keys[1].trim_start_matches("settings:");
    assert_ne!(secrets_hash, settings_hash);
    assert_eq!(
        secrets_hash,
        derive(&Pepper::new(SECRETS_PEPPER), "42").as_hex()
    );
    assert_eq!(
        settings_hash,
        derive(&Pepper::new(SETTINGS_PEPPER), "42").as_hex()
    );
}
