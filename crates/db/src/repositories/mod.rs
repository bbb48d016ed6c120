//! Storage seams used by the API layer.
//!
//! Each trait has a PostgreSQL implementation (`user::PgUserRepository`,
//! `event::PgEventRepository`), an in-memory one in [`crate::memory`], and a
//! `mockall` mock generated alongside it.

pub mod event;
pub mod user;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::Result;
use mockall::automock;
use uuid::Uuid;

use crate::models::{
    DbEvent, DbUpload, DbUser, NewEvent, NewUpload, NewUser, ProfileChanges, ProfileUpdate,
};

#[automock]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user, or returns `None` when the username or email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<DbUser>>;

    /// Looks a user up by username or (normalized) email.
    async fn get_user_by_credential(&self, credential: &str) -> Result<Option<DbUser>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>>;

    /// Applies the changes atomically; an email already held by another user
    /// yields [`ProfileUpdate::EmailTaken`] and leaves the row untouched.
    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<ProfileUpdate>;

    /// Returns `false` if no such user exists.
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool>;

    /// Returns `false` if no such user exists.
    async fn set_profile_picture(&self, id: Uuid, filename: &str) -> Result<bool>;
}

#[automock]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Inserts the event and, if given, its attachment as one atomic unit.
    async fn create_event(&self, event: &NewEvent, upload: Option<NewUpload>) -> Result<DbEvent>;

    async fn get_event_by_id(&self, id: Uuid) -> Result<Option<DbEvent>>;

    /// Events owned by `user_id` starting within `[from, to]`, earliest first.
    async fn get_events_between(
        &self,
        user_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<DbEvent>>;

    /// Every event owned by `user_id`, latest first.
    async fn get_events_by_user(&self, user_id: Uuid) -> Result<Vec<DbEvent>>;

    /// Deletes the event's uploads and then the event itself in one step.
    /// Returns `false` if no event with that id is owned by `user_id`.
    async fn delete_event(&self, id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn get_upload_by_event_id(&self, event_id: Uuid) -> Result<Option<DbUpload>>;
}
