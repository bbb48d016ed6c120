use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time_utc: NaiveDateTime,
    pub end_time_utc: NaiveDateTime,
    pub importance: i32,
    pub created_at: DateTime<Utc>,
    pub has_attachment: bool,
}

/// JSON body of `POST /events`. Multipart submissions carry the same fields
/// as text parts plus an optional `file` part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// `HH:MM`; midnight when absent.
    pub time: Option<String>,
    pub importance: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEventsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEventResponse {
    pub success: bool,
    pub id: Uuid,
}
