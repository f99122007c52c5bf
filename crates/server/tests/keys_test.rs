mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use ripple_crypto::{decode_public_key, generate_keypair, message_key, shared_secret};
use ripple_shared::{Body, ThreadId};

async fn setup() -> (TestServer, sqlx::SqlitePool) {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone());
    let server = TestServer::new(app).unwrap();
    (server, pool)
}

#[tokio::test]
async fn set_and_get_public_key() {
    let (server, pool) = setup().await;

    let (user_id, token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;

    // no key uploaded yet
    let (h, v) = common::auth_header(&token);
    let res = server
        .get(&format!("/api/users/{}/public-key", user_id))
        .add_header(h, v)
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert!(body["publicKey"].is_null());

    let keypair = generate_keypair();
    let (h, v) = common::auth_header(&token);
    server
        .put("/api/users/me/public-key")
        .add_header(h, v)
        .json(&json!({ "publicKey": keypair.public_base64() }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (h, v) = common::auth_header(&token);
    let res = server
        .get(&format!("/api/users/{}/public-key", user_id))
        .add_header(h, v)
        .await;
    let body: serde_json::Value = res.json();
    assert_eq!(body["publicKey"], json!(keypair.public_base64()));
}

#[tokio::test]
async fn malformed_public_key_rejected() {
    let (server, pool) = setup().await;

    let (_, token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;

    let (h, v) = common::auth_header(&token);
    server
        .put("/api/users/me/public-key")
        .add_header(h, v)
        .json(&json!({ "publicKey": "not base64!!" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // valid base64 of the wrong length
    let (h, v) = common::auth_header(&token);
    server
        .put("/api/users/me/public-key")
        .add_header(h, v)
        .json(&json!({ "publicKey": "c2hvcnQ=" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_user_key_is_not_found() {
    let (server, pool) = setup().await;

    let (_, token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;

    let (h, v) = common::auth_header(&token);
    server
        .get("/api/users/no-such-user/public-key")
        .add_header(h, v)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// Full E2EE round trip: both users publish keys, the sender encrypts with
/// the derived thread key, the server only ever sees the envelope, and the
/// recipient independently derives the same key and recovers the text.
#[tokio::test]
async fn encrypted_send_round_trip() {
    let (server, pool) = setup().await;

    let (alice_id, alice_token) =
        common::create_test_user(&pool, "alice@test.com", "alice", "password123").await;
    let (bob_id, bob_token) =
        common::create_test_user(&pool, "bob@test.com", "bob", "password123").await;

    let alice_keys = generate_keypair();
    let bob_keys = generate_keypair();

    let (h, v) = common::auth_header(&alice_token);
    server
        .put("/api/users/me/public-key")
        .add_header(h, v)
        .json(&json!({ "publicKey": alice_keys.public_base64() }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (h, v) = common::auth_header(&bob_token);
    server
        .put("/api/users/me/public-key")
        .add_header(h, v)
        .json(&json!({ "publicKey": bob_keys.public_base64() }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // alice fetches bob's key and seals the message
    let (h, v) = common::auth_header(&alice_token);
    let res = server
        .get(&format!("/api/users/{}/public-key", bob_id))
        .add_header(h, v)
        .await;
    let bob_public = decode_public_key(res.json::<serde_json::Value>()["publicKey"].as_str().unwrap())
        .unwrap();

    let thread = ThreadId::derive(&alice_id, &bob_id).unwrap();
    let alice_key = message_key(&shared_secret(&alice_keys.secret, &bob_public), &thread);
    let body = ripple_crypto::seal_body(Some(&alice_key), "secret").unwrap();

    let (h, v) = common::auth_header(&alice_token);
    let res = server
        .post(&format!("/api/dms/{}/messages", bob_id))
        .add_header(h, v)
        .json(&json!({ "body": body }))
        .await;
    res.assert_status_ok();

    // the stored body is the envelope, never the literal text
    let stored: serde_json::Value = res.json();
    assert_eq!(stored["body"]["encrypted"], json!(true));
    assert!(stored["body"]["cipherText"].as_str().is_some());
    assert_ne!(stored["body"], json!("secret"));

    // bob lists the thread and decrypts with his own derivation
    let (h, v) = common::auth_header(&bob_token);
    let page: serde_json::Value = server
        .get(&format!("/api/dms/{}/messages", alice_id))
        .add_header(h, v)
        .await
        .json();
    let received: Body = serde_json::from_value(page["items"][0]["body"].clone()).unwrap();
    assert!(received.is_encrypted());

    let (h, v) = common::auth_header(&bob_token);
    let res = server
        .get(&format!("/api/users/{}/public-key", alice_id))
        .add_header(h, v)
        .await;
    let alice_public =
        decode_public_key(res.json::<serde_json::Value>()["publicKey"].as_str().unwrap()).unwrap();

    let bob_key = message_key(&shared_secret(&bob_keys.secret, &alice_public), &thread);
    assert_eq!(bob_key, alice_key);
    assert_eq!(
        ripple_crypto::open_body(Some(&bob_key), &received).unwrap(),
        "secret"
    );
}
