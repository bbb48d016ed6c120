use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "ok", "service": "planner-api" })
    );
}

#[tokio::test]
async fn test_version_reports_crate_version() {
    let ctx = TestContext::new();

    let body = ctx.server.get("/version").await.json::<Value>();

    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}
