//! End-to-end tests of the HTTP surface through the full router.

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use base64::Engine;
use common::{CLIENT_ID, CLIENT_SECRET, PASSWORD, create_player, test_resources};
use player_auth::{
    AppResources,
    api::build_router,
    entity::{password_reset_link, player, player_avatar},
    oauth2::TokenResponse,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{Value, json};

async fn server() -> (TestServer, AppResources) {
    let (resources, _) = test_resources().await;
    let server = TestServer::new(build_router(resources.clone())).expect("create test server");
    (server, resources)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

async fn login(server: &TestServer) -> TokenResponse {
    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json()
}

/// Register through the API so every default row exists, then log in.
async fn register_and_login(server: &TestServer, username: &str, email: &str) -> TokenResponse {
    server
        .post("/auth/create")
        .json(&json!({
            "username": username,
            "email": email,
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        }))
        .await
        .assert_status_ok();

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": username, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn stored_email(resources: &AppResources, username: &str) -> String {
    player::Entity::find()
        .filter(player::Column::Username.eq(username))
        .one(resources.db.as_ref())
        .await
        .unwrap()
        .expect("player")
        .email
}

#[tokio::test]
async fn healthz_and_ping() {
    let (server, _) = server().await;

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("ok");

    let response = server.get("/ping").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["response_text"], "pong");
    assert!(body["server_time"].is_string());
}

#[tokio::test]
async fn token_endpoint_get_with_query() {
    let (server, resources) = server().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let response = server
        .get("/auth/token")
        .add_query_param("grant_type", "password")
        .add_query_param("username", "alice")
        .add_query_param("password", PASSWORD)
        .add_query_param("client_id", CLIENT_ID)
        .add_query_param("client_secret", CLIENT_SECRET)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 7200);
    assert_eq!(body["scope"], "read");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn token_endpoint_post_with_basic_auth() {
    let (server, resources) = server().await;
    create_player(&resources.db, "alice", "alice@example.com").await;
    let credentials =
        base64::engine::general_purpose::STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"));

    let response = server
        .post("/auth/token")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {credentials}")).unwrap(),
        )
        .form(&[
            ("grant_type", "password"),
            ("username", "alice"),
            ("password", PASSWORD),
        ])
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn token_endpoint_rejections() {
    let (server, resources) = server().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let response = server
        .post("/auth/token")
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
        ])
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "unsupported_grant_type");

    let response = server
        .post("/auth/token")
        .form(&[
            ("grant_type", "password"),
            ("username", "alice"),
            ("password", PASSWORD),
            ("client_id", CLIENT_ID),
            ("client_secret", "wrong"),
        ])
        .await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_client");

    let response = server
        .post("/auth/token")
        .form(&[("grant_type", "password"), ("username", "alice")])
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let (server, resources) = server().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "nope nope nope" }))
        .await;
    let unknown_user = server
        .post("/auth/login")
        .json(&json!({ "username": "mallory", "password": PASSWORD }))
        .await;

    wrong_password.assert_status_unauthorized();
    unknown_user.assert_status_unauthorized();
    let a: Value = wrong_password.json();
    let b: Value = unknown_user.json();
    assert_eq!(a, b);
    assert_eq!(a["error"], "invalid_credentials");
}

#[tokio::test]
async fn login_rejects_unknown_fields() {
    let (server, _) = server().await;

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": PASSWORD, "admin": true }))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_request");
    assert!(body["response_text"].is_string());
}

#[tokio::test]
async fn me_and_sso_token_with_bearer() {
    let (server, resources) = server().await;
    let alice = create_player(&resources.db, "alice", "alice@example.com").await;
    let token = login(&server).await;

    let response = server
        .get("/auth/me")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], alice.id);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());

    let response = server
        .get("/sso-token")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token"].as_str().map(str::len), Some(30));
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn protected_routes_require_bearer() {
    let (server, _) = server().await;

    let response = server.get("/sso-token").await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "missing_token");
    assert!(body["response_text"].is_string());

    let response = server
        .get("/sso-token")
        .add_header(AUTHORIZATION, bearer("made-up-token"))
        .await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn create_account_and_log_in() {
    let (server, _) = server().await;

    let response = server
        .post("/auth/create")
        .add_header(
            HeaderName::from_static("x-real-ip"),
            HeaderValue::from_static("203.0.113.7"),
        )
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    login(&server).await;
}

#[tokio::test]
async fn create_account_validation_errors() {
    let (server, _) = server().await;

    let response = server
        .post("/auth/create")
        .json(&json!({
            "username": "al",
            "email": "alice@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        }))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_username");

    let response = server
        .post("/auth/create")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": PASSWORD,
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn password_reset_flow() {
    let (resources, mailer) = test_resources().await;
    let server = TestServer::new(build_router(resources.clone())).expect("create test server");
    create_player(&resources.db, "alice", "alice@example.com").await;

    let response = server
        .post("/reset-password/send-email")
        .json(&json!({ "email": "alice@example.com" }))
        .await;
    response.assert_status_ok();
    let known: Value = response.json();

    let response = server
        .post("/reset-password/send-email")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;
    response.assert_status_ok();
    let unknown: Value = response.json();
    assert_eq!(known, unknown);

    assert_eq!(mailer.sent().len(), 1);
    let link = password_reset_link::Entity::find()
        .one(resources.db.as_ref())
        .await
        .unwrap()
        .expect("link");

    let response = server.get(&format!("/reset-password/{}", link.token)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token"], link.token);

    let response = server
        .post(&format!("/reset-password/{}", link.token))
        .json(&json!({ "password": "new password 1", "password_confirm": "new password 2" }))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["error"], "password_mismatch");

    let response = server
        .post(&format!("/reset-password/{}", link.token))
        .json(&json!({ "password": "new password 1", "password_confirm": "new password 1" }))
        .await;
    response.assert_status_ok();

    let response = server.get(&format!("/reset-password/{}", link.token)).await;
    response.assert_status_not_found();

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "new password 1" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn reset_requests_are_rate_limited() {
    let (server, resources) = server().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    for _ in 0..5 {
        server
            .post("/reset-password/send-email")
            .json(&json!({ "email": "alice@example.com" }))
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/reset-password/send-email")
        .json(&json!({ "email": "alice@example.com" }))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn api_docs_are_served() {
    let (server, _) = server().await;
    server.get("/api-docs").await.assert_status_ok();
}

#[tokio::test]
async fn settings_change_email_motto_and_password() {
    let (server, resources) = server().await;
    let token = register_and_login(&server, "alice", "alice@example.com").await;

    let response = server
        .post("/settings")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .json(&json!({
            "email": "alice.new@example.com",
            "motto": "Lobby regular",
            "password": PASSWORD,
            "new_password": "brand new password",
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["response_text"], "Your changes have been saved");

    assert_eq!(stored_email(&resources, "alice").await, "alice.new@example.com");
    let avatar = player_avatar::Entity::find()
        .one(resources.db.as_ref())
        .await
        .unwrap()
        .expect("avatar");
    assert_eq!(avatar.motto, "Lobby regular");

    server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "brand new password" }))
        .await
        .assert_status_ok();
    server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": PASSWORD }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn settings_without_new_password_keep_the_old_one() {
    let (server, _) = server().await;
    let token = register_and_login(&server, "alice", "alice@example.com").await;

    server
        .post("/settings")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .json(&json!({
            "email": "alice@example.com",
            "motto": "",
            "password": PASSWORD,
        }))
        .await
        .assert_status_ok();

    login(&server).await;
}

#[tokio::test]
async fn settings_reject_wrong_current_password() {
    let (server, resources) = server().await;
    let token = register_and_login(&server, "alice", "alice@example.com").await;

    let response = server
        .post("/settings")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .json(&json!({
            "email": "mallory@example.com",
            "motto": "",
            "password": "not my password",
            "new_password": "brand new password",
        }))
        .await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_credentials");

    assert_eq!(stored_email(&resources, "alice").await, "alice@example.com");
    login(&server).await;
}

#[tokio::test]
async fn settings_reject_taken_email() {
    let (server, resources) = server().await;
    register_and_login(&server, "bob", "bob@example.com").await;
    let token = register_and_login(&server, "alice", "alice@example.com").await;

    let response = server
        .post("/settings")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .json(&json!({
            "email": "bob@example.com",
            "motto": "",
            "password": PASSWORD,
        }))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["error"], "email_taken");
    assert_eq!(stored_email(&resources, "alice").await, "alice@example.com");
}

#[tokio::test]
async fn settings_reject_short_new_password_and_long_motto() {
    let (server, _) = server().await;
    let token = register_and_login(&server, "alice", "alice@example.com").await;

    let response = server
        .post("/settings")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .json(&json!({
            "email": "alice@example.com",
            "motto": "",
            "password": PASSWORD,
            "new_password": "012345678",
        }))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["error"], "password_too_short");

    let response = server
        .post("/settings")
        .add_header(AUTHORIZATION, bearer(&token.access_token))
        .json(&json!({
            "email": "alice@example.com",
            "motto": "m".repeat(31),
            "password": PASSWORD,
        }))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["error"], "motto_too_long");

    login(&server).await;
}

#[tokio::test]
async fn settings_require_bearer() {
    let (server, _) = server().await;

    let response = server
        .post("/settings")
        .json(&json!({ "email": "a@example.com", "motto": "", "password": PASSWORD }))
        .await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "missing_token");
}
