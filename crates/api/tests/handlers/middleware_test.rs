use axum::{body::to_bytes, http::StatusCode};
use planner_api::middleware::{auth, error_handling::map_error};
use planner_core::errors::PlannerError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
#[case(PlannerError::BadRequest("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(PlannerError::Unauthorized("Invalid password".to_string()), StatusCode::UNAUTHORIZED)]
#[case(PlannerError::Forbidden("Not yours".to_string()), StatusCode::FORBIDDEN)]
#[case(PlannerError::NotFound("Event".to_string()), StatusCode::NOT_FOUND)]
#[case(PlannerError::Conflict("Username taken".to_string()), StatusCode::CONFLICT)]
#[case(PlannerError::Database(eyre::eyre!("pool timed out")), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn test_error_status_mapping(#[case] error: PlannerError, #[case] expected: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_error_envelope_carries_code_and_message() {
    let response = map_error(PlannerError::NotFound("Event 7".to_string()));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "not_found",
            "message": "Resource not found: Event 7",
        })
    );
}

#[tokio::test]
async fn test_internal_error_detail_is_not_exposed() {
    let error = PlannerError::Internal(Box::new(std::io::Error::other(
        "disk full at /var/lib/planner",
    )));

    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(!body.contains("disk full"));
    assert!(body.contains("Internal server error"));
}

#[test]
fn test_hash_password() {
    let password = "test_password";
    let hashed = auth::hash_password(password).unwrap();

    assert_ne!(hashed, password);
    assert!(hashed.starts_with("$argon2"));
}

#[test]
fn test_hashes_are_salted() {
    let first = auth::hash_password("same").unwrap();
    let second = auth::hash_password("same").unwrap();

    assert_ne!(first, second);
    assert!(auth::verify_password(&first, "same").unwrap());
    assert!(auth::verify_password(&second, "same").unwrap());
}

#[test]
fn test_verify_password_rejects_wrong_password() {
    let hashed = auth::hash_password("test_password").unwrap();

    assert!(!auth::verify_password(&hashed, "wrong_password").unwrap());
}

#[test]
fn test_verify_password_with_corrupt_hash_is_error() {
    assert!(auth::verify_password("not-a-phc-string", "anything").is_err());
}
