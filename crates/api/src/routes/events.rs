use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/events",
            get(handlers::events::list_events_for_day).post(handlers::events::create_event),
        )
        .route("/events/:id", delete(handlers::events::delete_event))
        .route(
            "/events/:id/attachment",
            get(handlers::events::get_attachment),
        )
        .route("/history", get(handlers::events::list_history))
}
