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

async fn send(server: &TestServer, token: &str, recipient_id: &str, text: &str) {
    let (h, v) = common::auth_header(token);
    server
        .post(&format!("/api/dms/{}/messages", recipient_id))
        .add_header(h, v)
        .json(&json!({ "body": text }))
        .await
        .assert_status_ok();
}

async fn unread_count(server: &TestServer, token: &str) -> i64 {
    let (h, v) = common::auth_header(token);
    let conversations: Vec<serde_json::Value> =
        server.get("/api/dms").add_header(h, v).await.json();
    conversations[0]["unreadCount"].as_i64().unwrap()
}

#[tokio::test]
async fn own_messages_are_never_unread() {
    let (server, pool) = setup().await;

    let (user1_id, user1_token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;
    let (user2_id, user2_token) =
        common::create_test_user(&pool, "bob@test.com", "bob", "password123").await;

    send(&server, &user1_token, &user2_id, "one").await;
    send(&server, &user1_token, &user2_id, "two").await;

    assert_eq!(unread_count(&server, &user1_token).await, 0);
    assert_eq!(unread_count(&server, &user2_token).await, 2);

    // a reply flips the asymmetry
    send(&server, &user2_token, &user1_id, "back at you").await;
    assert_eq!(unread_count(&server, &user1_token).await, 1);
}

#[tokio::test]
async fn mark_read_zeroes_then_new_messages_count_again() {
    let (server, pool) = setup().await;

    let (user1_id, user1_token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;
    let (user2_id, user2_token) =
        common::create_test_user(&pool, "bob@test.com", "bob", "password123").await;

    send(&server, &user1_token, &user2_id, "first").await;
    send(&server, &user1_token, &user2_id, "second").await;
    assert_eq!(unread_count(&server, &user2_token).await, 2);

    let (h, v) = common::auth_header(&user2_token);
    let res = server
        .post(&format!("/api/dms/{}/read", user1_id))
        .add_header(h, v)
        .json(&json!({}))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["unreadCount"], 0);

    assert_eq!(unread_count(&server, &user2_token).await, 0);

    // give the clock a tick so the next message lands after the marker
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    send(&server, &user1_token, &user2_id, "third").await;
    assert_eq!(unread_count(&server, &user2_token).await, 1);
}

#[tokio::test]
async fn read_marker_never_moves_backward() {
    let (server, pool) = setup().await;

    let (user1_id, user1_token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;
    let (user2_id, user2_token) =
        common::create_test_user(&pool, "bob@test.com", "bob", "password123").await;

    send(&server, &user1_token, &user2_id, "hello").await;

    let (h, v) = common::auth_header(&user2_token);
    let res = server
        .post(&format!("/api/dms/{}/read", user1_id))
        .add_header(h, v)
        .json(&json!({}))
        .await;
    res.assert_status_ok();
    let marked: serde_json::Value = res.json();
    let marker = marked["lastReadAt"].as_i64().unwrap();

    // a stale client tries to rewind to long ago; the marker holds
    let (h, v) = common::auth_header(&user2_token);
    let res = server
        .post(&format!("/api/dms/{}/read", user1_id))
        .add_header(h, v)
        .json(&json!({ "at": 5 }))
        .await;
    res.assert_status_ok();
    let rewound: serde_json::Value = res.json();
    assert_eq!(rewound["lastReadAt"].as_i64().unwrap(), marker);
    assert_eq!(rewound["unreadCount"], 0);
}

#[tokio::test]
async fn mark_read_without_thread_is_not_found() {
    let (server, pool) = setup().await;

    let (_, user1_token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;
    let (user2_id, _) =
        common::create_test_user(&pool, "bob@test.com", "bob", "password123").await;

    // no message was ever sent, so the thread does not exist yet
    let (h, v) = common::auth_header(&user1_token);
    let res = server
        .post(&format!("/api/dms/{}/read", user2_id))
        .add_header(h, v)
        .json(&json!({}))
        .await;
    res.assert_status(StatusCode::NOT_FOUND);
}
