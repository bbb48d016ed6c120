use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Duration;
use planner_api::{notifications::EmailNotifier, services::auth::FORGOT_PASSWORD_MESSAGE};
use planner_db::{memory::InMemoryStore, repositories::UserRepository};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{
    bearer, server_with_notifier, token_for, RecordingNotifier, Sent, TestContext, PASSWORD,
    RESET_PASSWORD,
};

#[tokio::test]
async fn test_register_then_login_by_username_and_email() {
    let ctx = TestContext::new();
    assert_eq!(ctx.register("ash").await, StatusCode::CREATED);

    let by_username = ctx.login("ash", PASSWORD).await;
    assert_eq!(by_username["success"], json!(true));
    assert_eq!(by_username["username"], json!("ash"));
    assert_eq!(by_username["email"], json!("ash@example.com"));
    assert!(by_username["token"].as_str().is_some_and(|t| !t.is_empty()));

    let by_email = ctx.login("ASH@example.com", PASSWORD).await;
    assert_eq!(by_email["user_id"], by_username["user_id"]);
}

#[tokio::test]
async fn test_register_stores_only_a_password_hash() {
    let ctx = TestContext::new();
    let user = ctx.user("misty").await;

    let stored = ctx.store.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_register_sends_welcome_notification() {
    let ctx = TestContext::new();
    ctx.user("brock").await;

    assert_eq!(
        ctx.notifier.sent(),
        vec![Sent::SignUp("brock@example.com".to_string())]
    );
}

#[tokio::test]
async fn test_register_succeeds_when_notification_fails() {
    let ctx = TestContext::with_notifier(RecordingNotifier::failing());

    assert_eq!(ctx.register("gary").await, StatusCode::CREATED);
    assert_eq!(ctx.store.user_count(), 1);
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let ctx = TestContext::new();
    assert_eq!(ctx.register("ash").await, StatusCode::CREATED);

    let response = ctx
        .server
        .post("/register")
        .json(&json!({
            "name": "Other",
            "surname": "Person",
            "username": "ash",
            "email": "other@example.com",
            "password": PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], json!("conflict"));
    assert_eq!(ctx.store.user_count(), 1);
}

#[tokio::test]
async fn test_register_duplicate_email_ignores_case() {
    let ctx = TestContext::new();
    assert_eq!(ctx.register("ash").await, StatusCode::CREATED);

    let response = ctx
        .server
        .post("/register")
        .json(&json!({
            "name": "Other",
            "surname": "Person",
            "username": "ash2",
            "email": "Ash@Example.com",
            "password": PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(ctx.store.user_count(), 1);
}

#[tokio::test]
async fn test_register_missing_fields_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/register")
        .json(&json!({ "username": "ash", "password": PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("bad_request"));
    assert_eq!(ctx.store.user_count(), 0);
}

#[tokio::test]
async fn test_login_unknown_user_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/login")
        .json(&json!({ "credential": "nobody", "password": PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    ctx.register("ash").await;

    let response = ctx
        .server
        .post("/login")
        .json(&json!({ "credential": "ash", "password": "wrong-password" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], json!("unauthorized"));
}

#[tokio::test]
async fn test_login_missing_fields_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx.server.post("/login").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/history").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer("not-a-jwt");
    let response = ctx.server.get("/history").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (name, value) = bearer(&token_for(user.id, Duration::minutes(-5)));
    let response = ctx.server.get("/history").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let forged = planner_api::middleware::auth::TokenIssuer::new("other", Duration::minutes(5))
        .issue(user.id, &user.username)
        .unwrap();
    let (name, value) = bearer(&forged);
    let response = ctx.server.get("/history").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_resets_and_mails_new_password() {
    let ctx = TestContext::new();
    ctx.register("ash").await;

    let response = ctx
        .server
        .post("/forgot")
        .json(&json!({ "email": "ash@example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["message"],
        json!(FORGOT_PASSWORD_MESSAGE)
    );
    assert!(ctx
        .notifier
        .sent()
        .contains(&Sent::ForgotPassword("ash@example.com".to_string())));

    let old = ctx.login("ash", PASSWORD).await;
    assert_eq!(old["error"], json!("unauthorized"));

    let new = ctx.login("ash", RESET_PASSWORD).await;
    assert_eq!(new["success"], json!(true));
}

#[tokio::test]
async fn test_forgot_password_unknown_email_is_generic() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/forgot")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["message"],
        json!(FORGOT_PASSWORD_MESSAGE)
    );
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_forgot_password_keeps_old_password_when_mail_fails() {
    let ctx = TestContext::with_notifier(RecordingNotifier::failing());
    ctx.register("ash").await;

    let response = ctx
        .server
        .post("/forgot")
        .json(&json!({ "email": "ash@example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(ctx.login("ash", PASSWORD).await["success"], json!(true));
}

#[tokio::test]
async fn test_token_for_unknown_account_cannot_read_other_users() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (name, value) = bearer(&token_for(Uuid::new_v4(), Duration::minutes(5)));
    let response = ctx
        .server
        .get(&format!("/users/{}", user.id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_forgot_password_without_mail_relay_keeps_password() {
    let store = InMemoryStore::new();
    let pictures_dir = tempfile::tempdir().unwrap();
    let server = server_with_notifier(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(EmailNotifier::logging("no-reply@test")),
        &pictures_dir,
    );

    let register = server
        .post("/register")
        .json(&json!({
            "name": "Vic",
            "surname": "Tim",
            "username": "victim",
            "email": "victim@example.com",
            "password": PASSWORD,
        }))
        .await;
    assert_eq!(register.status_code(), StatusCode::CREATED);

    let forgot = server
        .post("/forgot")
        .json(&json!({ "email": "victim@example.com" }))
        .await;
    assert_eq!(forgot.status_code(), StatusCode::OK);
    assert_eq!(forgot.json::<Value>()["message"], json!(FORGOT_PASSWORD_MESSAGE));

    let login = server
        .post("/login")
        .json(&json!({ "credential": "victim", "password": PASSWORD }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
}
