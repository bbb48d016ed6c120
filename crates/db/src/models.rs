use chrono::{DateTime, NaiveDateTime, Utc};
use planner_core::models::{event::Event, user::User};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbUser {
    /// Public view of the record. `pictures_base` is the URL prefix the
    /// picture filename is appended to.
    pub fn into_user(self, pictures_base: &str) -> User {
        let profile_picture_url = self
            .profile_picture
            .as_ref()
            .map(|filename| format!("{}/{}", pictures_base.trim_end_matches('/'), filename));

        User {
            id: self.id,
            name: self.name,
            surname: self.surname,
            username: self.username,
            email: self.email,
            profile_picture: self.profile_picture,
            profile_picture_url,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEvent {
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

impl From<DbEvent> for Event {
    fn from(event: DbEvent) -> Self {
        Event {
            id: event.id,
            user_id: event.user_id,
            title: event.title,
            description: event.description,
            start_time_utc: event.start_time_utc,
            end_time_utc: event.end_time_utc,
            importance: event.importance,
            created_at: event.created_at,
            has_attachment: event.has_attachment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUpload {
    pub id: Uuid,
    pub filename: String,
    pub filedata: Vec<u8>,
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time_utc: NaiveDateTime,
    pub end_time_utc: NaiveDateTime,
    pub importance: i32,
}

/// Attachment written in the same transaction as its event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpload {
    pub filename: String,
    pub filedata: Vec<u8>,
}

/// Allow-listed profile fields; `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

/// Result of applying [`ProfileChanges`].
#[derive(Debug, Clone)]
pub enum ProfileUpdate {
    Updated(DbUser),
    UserNotFound,
    /// The new email belongs to another user.
    EmailTaken,
}
