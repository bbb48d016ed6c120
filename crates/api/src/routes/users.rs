use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/users/:id",
            get(handlers::users::get_user).put(handlers::users::update_user),
        )
        .route(
            "/users/:id/check-password",
            post(handlers::users::check_password),
        )
        .route(
            "/users/:id/update-password",
            put(handlers::users::update_password),
        )
        .route(
            "/users/:id/profile-picture",
            post(handlers::users::upload_profile_picture),
        )
}
