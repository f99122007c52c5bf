mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

async fn setup() -> (TestServer, sqlx::SqlitePool) {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone());
    let server = TestServer::new(app).unwrap();
    (server, pool)
}

#[tokio::test]
async fn sign_up_creates_session() {
    let (server, _pool) = setup().await;

    let res = server
        .post("/api/auth/sign-up/email")
        .json(&json!({
            "email": "alice@test.com",
            "username": "alice",
            "password": "password123",
        }))
        .await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["token"].as_str().is_some());

    // the returned token authenticates requests
    let token = body["token"].as_str().unwrap().to_string();
    let (h, v) = common::auth_header(&token);
    let me = server.get("/api/users/me").add_header(h, v).await;
    me.assert_status_ok();
}

#[tokio::test]
async fn sign_up_rejects_duplicates() {
    let (server, pool) = setup().await;

    common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;

    let res = server
        .post("/api/auth/sign-up/email")
        .json(&json!({
            "email": "alice@test.com",
            "username": "alice2",
            "password": "password123",
        }))
        .await;
    res.assert_status(StatusCode::CONFLICT);

    let res = server
        .post("/api/auth/sign-up/email")
        .json(&json!({
            "email": "other@test.com",
            "username": "alice",
            "password": "password123",
        }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn sign_up_rejects_weak_password() {
    let (server, _pool) = setup().await;

    let res = server
        .post("/api/auth/sign-up/email")
        .json(&json!({
            "email": "alice@test.com",
            "username": "alice",
            "password": "short",
        }))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_in_and_out() {
    let (server, pool) = setup().await;

    common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;

    let res = server
        .post("/api/auth/sign-in/email")
        .json(&json!({"email": "alice@test.com", "password": "wrong-password"}))
        .await;
    res.assert_status(StatusCode::UNAUTHORIZED);

    let res = server
        .post("/api/auth/sign-in/email")
        .json(&json!({"email": "alice@test.com", "password": "password123"}))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let token = body["token"].as_str().unwrap().to_string();

    let (h, v) = common::auth_header(&token);
    let res = server.get("/api/auth/get-session").add_header(h, v).await;
    res.assert_status_ok();
    let session: serde_json::Value = res.json();
    assert_eq!(session["user"]["username"], "alice");

    let (h, v) = common::auth_header(&token);
    server.post("/api/auth/sign-out").add_header(h, v).await.assert_status_ok();

    // session is gone
    let (h, v) = common::auth_header(&token);
    let res = server.get("/api/auth/get-session").add_header(h, v).await;
    res.assert_status_ok();
    let session: serde_json::Value = res.json();
    assert!(session.is_null());
}

#[tokio::test]
async fn protected_route_requires_auth() {
    let (server, _pool) = setup().await;

    let res = server.get("/api/dms").await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}
