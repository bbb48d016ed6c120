use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    Json,
};
use planner_core::models::user::{
    CheckPasswordRequest, CheckPasswordResponse, ProfilePictureResponse, UpdatePasswordRequest,
    UpdatePasswordResponse, UpdateUserRequest, UpdateUserResponse, User,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    handlers::read_file_field,
    middleware::{auth::AuthUser, error_handling::AppError},
    services, ApiState,
};

/// Multipart part carrying the picture.
const PICTURE_FIELD: &str = "profile_picture";

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = path?;
    let user = services::users::get_user(&state, &auth, id).await?;

    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UpdateUserResponse>, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let response = services::users::update_user(&state, &auth, id, request).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn check_password(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CheckPasswordRequest>, JsonRejection>,
) -> Result<Json<CheckPasswordResponse>, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let response = services::users::check_password(&state, &auth, id, request).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_password(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<Json<UpdatePasswordResponse>, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let response = services::users::update_password(&state, &auth, id, request).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn upload_profile_picture(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProfilePictureResponse>, AppError> {
    let Path(id) = path?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PICTURE_FIELD) {
            upload = read_file_field(field).await?;
        }
    }

    let response = services::users::upload_profile_picture(&state, &auth, id, upload).await?;
    Ok(Json(response))
}
