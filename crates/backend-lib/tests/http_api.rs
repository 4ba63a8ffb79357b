//! End-to-end tests driving the HTTP surface through the router.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use backend_lib::auth::password::MIN_COST;
use backend_lib::config::Settings;
use backend_lib::router::create_router;
use backend_lib::storage::FlatFileDirectory;
use backend_lib::AppState;

fn test_app(dir: &TempDir, max_requests: usize) -> Router {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = "test-secret".to_string();
    settings.auth.bcrypt_cost = MIN_COST;
    settings.rate_limit.max_requests = max_requests;

    let directory = FlatFileDirectory::new(dir.path()).unwrap();
    create_router(Arc::new(AppState::new(directory, settings)))
}

fn post_json(uri: &str, ip: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-real-ip", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "correct-horse-battery",
    })
}

#[tokio::test]
async fn register_login_me_roundtrip() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 100);

    // register
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            "10.1.0.1",
            register_body("alice", "alice@x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body_json(response).await;
    assert!(user["id"].as_u64().unwrap() > 0);
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    // login
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            "10.1.0.1",
            json!({ "username": "alice", "password": "correct-horse-battery" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    let token = login["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(login["user"]["username"], "alice");

    // the issued token authenticates /api/me
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let claims = body_json(response).await;
    assert_eq!(claims["username"], "alice");
    assert_eq!(claims["email"], "alice@x.com");
}

#[tokio::test]
async fn duplicate_registration_returns_conflict_with_the_field() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 100);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            "10.1.0.2",
            register_body("alice", "a@x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            "10.1.0.2",
            register_body("alice", "b@x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "CONFLICT_001");
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("username"));
}

#[tokio::test]
async fn malformed_registration_is_a_validation_error() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 100);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            "10.1.0.3",
            register_body("al", "alice@x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn failed_logins_share_one_external_shape() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 100);

    app.clone()
        .oneshot(post_json(
            "/api/register",
            "10.1.0.4",
            register_body("alice", "alice@x.com"),
        ))
        .await
        .unwrap();

    let ghost = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            "10.1.0.4",
            json!({ "username": "ghost", "password": "whatever-here" }),
        ))
        .await
        .unwrap();
    let wrong = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            "10.1.0.4",
            json!({ "username": "alice", "password": "not-the-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(ghost.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    // identical bodies: nothing distinguishes unknown user from bad password
    let ghost_body = body_json(ghost).await;
    let wrong_body = body_json(wrong).await;
    assert_eq!(ghost_body, wrong_body);
}

#[tokio::test]
async fn auth_endpoints_are_rate_limited() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 3);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/login",
                "10.9.9.9",
                json!({ "username": "nobody", "password": "irrelevant-pw" }),
            ))
            .await
            .unwrap();
        // admitted: the limiter let it through to fail auth instead
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            "10.9.9.9",
            json!({ "username": "nobody", "password": "irrelevant-pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "RATE_001");

    // a different client is unaffected
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            "10.9.9.10",
            json!({ "username": "nobody", "password": "irrelevant-pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_rejects_missing_and_invalid_tokens() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 100);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir, 100);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}
