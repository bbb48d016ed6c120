//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and a uniform JSON envelope:
//!
//! ```json
//! { "success": false, "error": "not_found", "message": "Resource not found: Event ..." }
//! ```
//!
//! Store and internal failures are logged with their full detail and answered
//! with a generic message; the detail never reaches the client.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planner_core::errors::PlannerError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on anything that
/// produces a [`PlannerError`], an `eyre::Report`, or an axum extractor
/// rejection.
#[derive(Debug)]
pub struct AppError(pub PlannerError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlannerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PlannerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PlannerError::Forbidden(_) => StatusCode::FORBIDDEN,
            PlannerError::NotFound(_) => StatusCode::NOT_FOUND,
            PlannerError::Conflict(_) => StatusCode::CONFLICT,
            PlannerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlannerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if self.0.is_internal() {
            tracing::error!("Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": self.0.code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        AppError(err)
    }
}

/// Unexpected failures from the store or other infrastructure.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(PlannerError::Database(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(PlannerError::BadRequest(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(PlannerError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(PlannerError::BadRequest(rejection.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError(PlannerError::BadRequest(rejection.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError(PlannerError::BadRequest(format!(
            "Invalid multipart body: {}",
            err.body_text()
        )))
    }
}

/// Maps a PlannerError to an HTTP response
pub fn map_error(err: PlannerError) -> Response {
    AppError(err).into_response()
}
