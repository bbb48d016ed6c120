//! # Event Orchestrator
//!
//! Creating an event validates the input, derives its timestamps, writes the
//! event and its optional attachment in one transaction, and then tells the
//! owner by email. The email is best effort: once the event is stored, the
//! request succeeds whatever the mail relay does.
//!
//! Deleting an event removes its attachment in the same transaction, so a
//! half-deleted event is never observable.

use planner_core::{
    authz::ensure_owner,
    errors::{PlannerError, PlannerResult},
    files::FileIntake,
    models::event::{DeleteEventResponse, Event},
    schedule::{day_bounds, event_span, parse_date},
};
use planner_db::models::{DbEvent, DbUpload, NewEvent, NewUpload};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    middleware::auth::AuthUser,
    services::{dispatch, UploadedFile},
    ApiState,
};

/// Everything `POST /events` accepts, whether it arrived as JSON or multipart.
#[derive(Debug, Clone, Default)]
pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: Option<String>,
    pub importance: Option<i32>,
    pub attachment: Option<UploadedFile>,
}

pub async fn create_event(
    state: &ApiState,
    acting: &AuthUser,
    input: CreateEventInput,
) -> PlannerResult<Event> {
    let title = input.title.trim();
    if title.is_empty() || input.date.trim().is_empty() {
        return Err(PlannerError::BadRequest(
            "title and date are required".to_string(),
        ));
    }

    let (start, end) = event_span(&input.date, input.time.as_deref())?;

    let upload = input
        .attachment
        .map(|file| FileIntake::attachment().accept(&file.filename, file.data))
        .transpose()?
        .map(|file| NewUpload {
            filename: file.filename,
            filedata: file.data,
        });

    let new_event = NewEvent {
        user_id: acting.user_id,
        title: title.to_string(),
        description: input.description,
        start_time_utc: start,
        end_time_utc: end,
        importance: input.importance.unwrap_or(0),
    };

    let event = state.events.create_event(&new_event, upload).await?;

    info!(
        event_id = %event.id,
        user_id = %event.user_id,
        has_attachment = event.has_attachment,
        "Event created"
    );

    notify_event_created(state, &event).await;

    Ok(event.into())
}

async fn notify_event_created(state: &ApiState, event: &DbEvent) {
    let owner = match state.users.get_user_by_id(event.user_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            warn!(event_id = %event.id, "Event owner not found, skipping notification");
            return;
        }
        Err(e) => {
            warn!(event_id = %event.id, "Could not look up event owner: {:#}", e);
            return;
        }
    };

    dispatch(
        "event_created",
        &owner.email,
        state.notifier.on_event_created(
            &owner.email,
            &event.title,
            &event.description,
            event.start_time_utc,
            event.importance,
        ),
    )
    .await;
}

/// Events of the acting user starting on `date`, earliest first.
pub async fn list_for_day(
    state: &ApiState,
    acting: &AuthUser,
    date: Option<&str>,
) -> PlannerResult<Vec<Event>> {
    let date = date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| PlannerError::BadRequest("missing date parameter".to_string()))?;

    let (from, to) = day_bounds(parse_date(date)?);
    let events = state
        .events
        .get_events_between(acting.user_id, from, to)
        .await?;

    Ok(events.into_iter().map(Event::from).collect())
}

/// Every event of the acting user.
pub async fn list_all(state: &ApiState, acting: &AuthUser) -> PlannerResult<Vec<Event>> {
    let events = state.events.get_events_by_user(acting.user_id).await?;
    Ok(events.into_iter().map(Event::from).collect())
}

/// Loads an event the acting user owns.
async fn owned_event(state: &ApiState, acting: &AuthUser, event_id: Uuid) -> PlannerResult<DbEvent> {
    let event = state
        .events
        .get_event_by_id(event_id)
        .await?
        .ok_or_else(|| PlannerError::NotFound(format!("Event with ID {} not found", event_id)))?;

    ensure_owner(acting.user_id, event.user_id, "event")?;
    Ok(event)
}

pub async fn delete_event(
    state: &ApiState,
    acting: &AuthUser,
    event_id: Uuid,
) -> PlannerResult<DeleteEventResponse> {
    owned_event(state, acting, event_id).await?;

    // Another request may have deleted it since the lookup.
    if !state.events.delete_event(event_id, acting.user_id).await? {
        return Err(PlannerError::NotFound(format!(
            "Event with ID {} not found",
            event_id
        )));
    }

    info!(event_id = %event_id, user_id = %acting.user_id, "Event deleted");

    Ok(DeleteEventResponse {
        success: true,
        id: event_id,
    })
}

pub async fn get_attachment(
    state: &ApiState,
    acting: &AuthUser,
    event_id: Uuid,
) -> PlannerResult<DbUpload> {
    owned_event(state, acting, event_id).await?;

    state
        .events
        .get_upload_by_event_id(event_id)
        .await?
        .ok_or_else(|| PlannerError::NotFound(format!("Event {} has no attachment", event_id)))
}
