use std::sync::Arc;

use axum::http::{header, StatusCode};
use chrono::Duration;
use planner_db::{memory::InMemoryStore, mock::repositories::MockEventRepository};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{
    bearer, multipart_body, server_with, token_for, RecordingNotifier, Sent, TestContext,
    TestUser,
};

async fn create_json(ctx: &TestContext, user: &TestUser, body: Value) -> (StatusCode, Value) {
    let (name, value) = user.auth();
    let response = ctx
        .server
        .post("/events")
        .add_header(name, value)
        .json(&body)
        .await;

    (response.status_code(), response.json::<Value>())
}

async fn list_day(ctx: &TestContext, user: &TestUser, date: &str) -> Vec<Value> {
    let (name, value) = user.auth();
    let response = ctx
        .server
        .get(&format!("/events?date={date}"))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Vec<Value>>()
}

#[tokio::test]
async fn test_create_event_with_time() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (status, event) = create_json(
        &ctx,
        &user,
        json!({ "title": "Standup", "date": "2025-12-03", "time": "14:30" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["title"], json!("Standup"));
    assert_eq!(event["start_time_utc"], json!("2025-12-03T14:30:00"));
    assert_eq!(event["end_time_utc"], json!("2025-12-03T14:30:00"));
    assert_eq!(event["user_id"], json!(user.id));
    assert_eq!(event["importance"], json!(0));
    assert_eq!(event["has_attachment"], json!(false));
}

#[tokio::test]
async fn test_create_event_stores_description_as_given() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (status, event) = create_json(
        &ctx,
        &user,
        json!({ "title": "Notes", "description": "  - bring slides\n", "date": "2025-12-03" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["description"], json!("  - bring slides\n"));
}

#[tokio::test]
async fn test_create_event_without_time_starts_at_midnight() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (status, event) = create_json(
        &ctx,
        &user,
        json!({ "title": "Holiday", "date": "2025-12-25", "importance": 3 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["start_time_utc"], json!("2025-12-25T00:00:00"));
    assert_eq!(event["importance"], json!(3));
}

#[tokio::test]
async fn test_create_event_ignores_client_user_id() {
    let ctx = TestContext::new();
    let ash = ctx.user("ash").await;
    let misty = ctx.user("misty").await;

    let (status, event) = create_json(
        &ctx,
        &ash,
        json!({ "title": "Sneaky", "date": "2025-12-03", "user_id": misty.id }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["user_id"], json!(ash.id));
    assert!(list_day(&ctx, &misty, "2025-12-03").await.is_empty());
}

#[tokio::test]
async fn test_create_event_requires_title_and_date() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    for body in [
        json!({ "date": "2025-12-03" }),
        json!({ "title": "   ", "date": "2025-12-03" }),
        json!({ "title": "Standup" }),
    ] {
        let (status, error) = create_json(&ctx, &user, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], json!("bad_request"));
    }

    assert_eq!(ctx.store.event_count(), 0);
}

#[tokio::test]
async fn test_create_event_rejects_malformed_date_and_time() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    for body in [
        json!({ "title": "Standup", "date": "03/12/2025" }),
        json!({ "title": "Standup", "date": "2025-12-03", "time": "25:00" }),
    ] {
        let (status, _) = create_json(&ctx, &user, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(ctx.store.event_count(), 0);
}

#[tokio::test]
async fn test_create_event_requires_token() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/events")
        .json(&json!({ "title": "Standup", "date": "2025-12-03" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.store.event_count(), 0);
}

#[tokio::test]
async fn test_standup_day_view_is_per_user() {
    let ctx = TestContext::new();
    let ash = ctx.user("ash").await;
    let misty = ctx.user("misty").await;

    let (status, created) = create_json(
        &ctx,
        &ash,
        json!({ "title": "Standup", "description": "daily", "date": "2025-12-03", "time": "14:30" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    create_json(
        &ctx,
        &ash,
        json!({ "title": "Breakfast", "date": "2025-12-03", "time": "08:00" }),
    )
    .await;
    create_json(
        &ctx,
        &ash,
        json!({ "title": "Tomorrow", "date": "2025-12-04", "time": "00:00" }),
    )
    .await;

    let day = list_day(&ctx, &ash, "2025-12-03").await;
    let titles: Vec<&str> = day.iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Breakfast", "Standup"]);
    assert_eq!(day[1]["id"], created["id"]);

    assert!(list_day(&ctx, &misty, "2025-12-03").await.is_empty());
}

#[tokio::test]
async fn test_register_login_create_and_list_scenario() {
    let ctx = TestContext::new();
    let a = ctx.user("user_a").await;

    let (status, _) =
        create_json(&ctx, &a, json!({ "title": "Standup", "date": "2025-01-10" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let day = list_day(&ctx, &a, "2025-01-10").await;
    assert_eq!(day.len(), 1);
    assert_eq!(day[0]["title"], json!("Standup"));

    let b = ctx.user("user_b").await;
    assert!(list_day(&ctx, &b, "2025-01-10").await.is_empty());
}

#[tokio::test]
async fn test_list_events_requires_date() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (name, value) = user.auth();
    let response = ctx.server.get("/events").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_lists_all_own_events_newest_first() {
    let ctx = TestContext::new();
    let ash = ctx.user("ash").await;
    let misty = ctx.user("misty").await;

    for (title, date) in [("Old", "2024-01-01"), ("New", "2025-06-01")] {
        create_json(&ctx, &ash, json!({ "title": title, "date": date })).await;
    }
    create_json(&ctx, &misty, json!({ "title": "Hers", "date": "2025-01-01" })).await;

    let (name, value) = ash.auth();
    let history = ctx
        .server
        .get("/history")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();

    let titles: Vec<&str> = history.iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["New", "Old"]);
}

#[tokio::test]
async fn test_create_event_with_attachment_then_download() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (content_type, body) = multipart_body(
        &[
            ("title", "Review"),
            ("date", "2025-12-03"),
            ("time", "09:15"),
            ("importance", "2"),
        ],
        Some(("file", "agenda.pdf", b"%PDF-1.4 agenda")),
    );
    let (name, value) = user.auth();
    let response = ctx
        .server
        .post("/events")
        .add_header(name, value)
        .content_type(&content_type)
        .bytes(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let event = response.json::<Value>();
    assert_eq!(event["has_attachment"], json!(true));
    assert_eq!(event["importance"], json!(2));
    assert_eq!(event["start_time_utc"], json!("2025-12-03T09:15:00"));
    assert_eq!(ctx.store.upload_count(), 1);

    let (name, value) = user.auth();
    let download = ctx
        .server
        .get(&format!("/events/{}/attachment", event["id"].as_str().unwrap()))
        .add_header(name, value)
        .await;

    assert_eq!(download.status_code(), StatusCode::OK);
    assert_eq!(download.as_bytes().as_ref(), b"%PDF-1.4 agenda");
    assert_eq!(
        download.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"agenda.pdf\""
    );
}

#[tokio::test]
async fn test_multipart_without_file_creates_plain_event() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (content_type, body) =
        multipart_body(&[("title", "Plain"), ("date", "2025-12-03")], None);
    let (name, value) = user.auth();
    let response = ctx
        .server
        .post("/events")
        .add_header(name, value)
        .content_type(&content_type)
        .bytes(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["has_attachment"], json!(false));
    assert_eq!(ctx.store.upload_count(), 0);
}

#[tokio::test]
async fn test_attachment_of_other_users_event_is_forbidden() {
    let ctx = TestContext::new();
    let ash = ctx.user("ash").await;
    let misty = ctx.user("misty").await;

    let (content_type, body) = multipart_body(
        &[("title", "Private"), ("date", "2025-12-03")],
        Some(("file", "secret.txt", b"secret")),
    );
    let (name, value) = ash.auth();
    let event = ctx
        .server
        .post("/events")
        .add_header(name, value)
        .content_type(&content_type)
        .bytes(body)
        .await
        .json::<Value>();

    let (name, value) = misty.auth();
    let response = ctx
        .server
        .get(&format!("/events/{}/attachment", event["id"].as_str().unwrap()))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_other_users_event_is_forbidden() {
    let ctx = TestContext::new();
    let ash = ctx.user("ash").await;
    let misty = ctx.user("misty").await;

    let (content_type, body) = multipart_body(
        &[("title", "Mine"), ("date", "2025-12-03")],
        Some(("file", "notes.txt", b"notes")),
    );
    let (name, value) = ash.auth();
    let event = ctx
        .server
        .post("/events")
        .add_header(name, value)
        .content_type(&content_type)
        .bytes(body)
        .await
        .json::<Value>();

    let (name, value) = misty.auth();
    let response = ctx
        .server
        .delete(&format!("/events/{}", event["id"].as_str().unwrap()))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(ctx.store.event_count(), 1);
    assert_eq!(ctx.store.upload_count(), 1);
}

#[tokio::test]
async fn test_delete_own_event_removes_event_and_upload() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (content_type, body) = multipart_body(
        &[("title", "Mine"), ("date", "2025-12-03")],
        Some(("file", "notes.txt", b"notes")),
    );
    let (name, value) = user.auth();
    let event = ctx
        .server
        .post("/events")
        .add_header(name, value)
        .content_type(&content_type)
        .bytes(body)
        .await
        .json::<Value>();
    let id = event["id"].as_str().unwrap();

    let (name, value) = user.auth();
    let response = ctx
        .server
        .delete(&format!("/events/{id}"))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": true, "id": id })
    );
    assert_eq!(ctx.store.event_count(), 0);
    assert_eq!(ctx.store.upload_count(), 0);

    let (name, value) = user.auth();
    let attachment = ctx
        .server
        .get(&format!("/events/{id}/attachment"))
        .add_header(name, value)
        .await;
    assert_eq!(attachment.status_code(), StatusCode::NOT_FOUND);

    let (name, value) = user.auth();
    let again = ctx
        .server
        .delete(&format!("/events/{id}"))
        .add_header(name, value)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_event_is_not_found() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    let (name, value) = user.auth();
    let response = ctx
        .server
        .delete(&format!("/events/{}", Uuid::new_v4()))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], json!("not_found"));
}

#[tokio::test]
async fn test_create_event_sends_notification() {
    let ctx = TestContext::new();
    let user = ctx.user("ash").await;

    create_json(&ctx, &user, json!({ "title": "Standup", "date": "2025-12-03" })).await;

    assert!(ctx.notifier.sent().contains(&Sent::EventCreated {
        email: "ash@example.com".to_string(),
        title: "Standup".to_string(),
    }));
}

#[tokio::test]
async fn test_create_event_succeeds_when_notification_fails() {
    let ctx = TestContext::with_notifier(RecordingNotifier::failing());
    let user = ctx.user("ash").await;

    let (status, _) =
        create_json(&ctx, &user, json!({ "title": "Standup", "date": "2025-12-03" })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ctx.store.event_count(), 1);
}

#[tokio::test]
async fn test_store_failure_returns_generic_internal_error() {
    let mut events = MockEventRepository::new();
    events
        .expect_create_event()
        .returning(|_, _| Err(eyre::eyre!("connection reset by peer")));

    let pictures_dir = tempfile::tempdir().unwrap();
    let server = server_with(
        Arc::new(InMemoryStore::new()),
        Arc::new(events),
        &pictures_dir,
    );

    let (name, value) = bearer(&token_for(Uuid::new_v4(), Duration::minutes(5)));
    let response = server
        .post("/events")
        .add_header(name, value)
        .json(&json!({ "title": "Standup", "date": "2025-12-03" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": false,
            "error": "internal",
            "message": "Internal server error",
        })
    );
}
