use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        FromRequest, Multipart, Path, Query, Request, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use planner_core::{
    errors::PlannerError,
    models::event::{CreateEventRequest, DeleteEventResponse, Event, ListEventsQuery},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    handlers::read_file_field,
    middleware::{auth::AuthUser, error_handling::AppError},
    services::{self, events::CreateEventInput},
    ApiState,
};

/// Body of `POST /events`: JSON, or multipart when a file is attached.
pub struct EventForm(pub CreateEventInput);

fn parse_importance(raw: &str) -> Result<Option<i32>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse()
        .map(Some)
        .map_err(|_| AppError(PlannerError::BadRequest(format!("Invalid importance '{raw}'"))))
}

#[async_trait]
impl FromRequest<Arc<ApiState>> for EventForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(body) = Json::<CreateEventRequest>::from_request(req, state).await?;
            return Ok(EventForm(CreateEventInput {
                title: body.title,
                description: body.description,
                date: body.date,
                time: body.time,
                importance: body.importance,
                attachment: None,
            }));
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut input = CreateEventInput::default();

        // Unknown parts (such as a client-sent user_id) are skipped.
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => input.attachment = read_file_field(field).await?,
                "title" => input.title = field.text().await?,
                "description" => input.description = field.text().await?,
                "date" => input.date = field.text().await?,
                "time" => input.time = Some(field.text().await?),
                "importance" => input.importance = parse_importance(&field.text().await?)?,
                _ => {}
            }
        }

        Ok(EventForm(input))
    }
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    EventForm(input): EventForm,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = services::events::create_event(&state, &auth, input).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[axum::debug_handler]
pub async fn list_events_for_day(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, AppError> {
    let Query(query) = query?;
    let events = services::events::list_for_day(&state, &auth, query.date.as_deref()).await?;

    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn list_history(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = services::events::list_all(&state, &auth).await?;

    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteEventResponse>, AppError> {
    let Path(id) = path?;
    let response = services::events::delete_event(&state, &auth, id).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn get_attachment(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let upload = services::events::get_attachment(&state, &auth, id).await?;

    // Header values must stay printable ASCII.
    let safe_name: String = upload
        .filename
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"')
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{safe_name}\""),
            ),
        ],
        upload.filedata,
    ))
}
