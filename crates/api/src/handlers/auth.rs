use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, Json};
use std::sync::Arc;
use planner_core::models::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse,
};

use crate::{middleware::error_handling::AppError, services, ApiState};

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;
    let response = services::auth::login(&state, request).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(request) = payload?;
    let response = services::auth::register(&state, request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;
    let response = services::auth::forgot_password(&state, request).await?;

    Ok(Json(response))
}
