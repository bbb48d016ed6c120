//! In-memory repositories for tests and local runs without PostgreSQL.
//!
//! Mirrors the constraints of the SQL schema: unique usernames and emails,
//! events must reference an existing user, at most one upload per event, and
//! event deletion removes the event's uploads under the same lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use eyre::{eyre, Result};
use uuid::Uuid;

use crate::models::{
    DbEvent, DbUpload, DbUser, NewEvent, NewUpload, NewUser, ProfileChanges, ProfileUpdate,
};
use crate::repositories::{EventRepository, UserRepository};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, DbUser>,
    events: HashMap<Uuid, DbEvent>,
    uploads: HashMap<Uuid, DbUpload>,
}

impl Tables {
    fn has_upload(&self, event_id: Uuid) -> bool {
        self.uploads.values().any(|u| u.event_id == Some(event_id))
    }

    fn with_attachment_flag(&self, event: &DbEvent) -> DbEvent {
        DbEvent {
            has_attachment: self.has_upload(event.id),
            ..event.clone()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| eyre!("in-memory store lock poisoned"))
    }

    pub fn user_count(&self) -> usize {
        self.lock().map(|t| t.users.len()).unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.lock().map(|t| t.events.len()).unwrap_or_default()
    }

    pub fn upload_count(&self) -> usize {
        self.lock().map(|t| t.uploads.len()).unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>> {
        let mut tables = self.lock()?;

        let taken = tables
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Ok(None);
        }

        let created = DbUser {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            profile_picture: None,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());

        Ok(Some(created))
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<DbUser>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn get_user_by_credential(&self, credential: &str) -> Result<Option<DbUser>> {
        let tables = self.lock()?;
        let email = credential.to_lowercase();

        let by_username = tables.users.values().find(|u| u.username == credential);
        let user = by_username.or_else(|| tables.users.values().find(|u| u.email == email));

        Ok(user.cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        let email = email.to_lowercase();
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<ProfileUpdate> {
        let mut tables = self.lock()?;

        if let Some(email) = &changes.email {
            let clash = tables
                .users
                .values()
                .any(|u| u.id != id && &u.email == email);
            if clash {
                return Ok(ProfileUpdate::EmailTaken);
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(ProfileUpdate::UserNotFound);
        };

        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(surname) = &changes.surname {
            user.surname = surname.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(picture) = &changes.profile_picture {
            user.profile_picture = Some(picture.clone());
        }

        Ok(ProfileUpdate::Updated(user.clone()))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let mut tables = self.lock()?;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_profile_picture(&self, id: Uuid, filename: &str) -> Result<bool> {
        let mut tables = self.lock()?;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.profile_picture = Some(filename.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create_event(&self, event: &NewEvent, upload: Option<NewUpload>) -> Result<DbEvent> {
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&event.user_id) {
            return Err(eyre!(
                "insert on events violates foreign key: user {} does not exist",
                event.user_id
            ));
        }

        let now = Utc::now();
        let created = DbEvent {
            id: Uuid::new_v4(),
            user_id: event.user_id,
            title: event.title.clone(),
            description: event.description.clone(),
            start_time_utc: event.start_time_utc,
            end_time_utc: event.end_time_utc,
            importance: event.importance,
            created_at: now,
            has_attachment: upload.is_some(),
        };

        if let Some(upload) = upload {
            let row = DbUpload {
                id: Uuid::new_v4(),
                filename: upload.filename,
                filedata: upload.filedata,
                user_id: event.user_id,
                event_id: Some(created.id),
                created_at: now,
            };
            tables.uploads.insert(row.id, row);
        }
        tables.events.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_event_by_id(&self, id: Uuid) -> Result<Option<DbEvent>> {
        let tables = self.lock()?;
        Ok(tables.events.get(&id).map(|e| tables.with_attachment_flag(e)))
    }

    async fn get_events_between(
        &self,
        user_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<DbEvent>> {
        let tables = self.lock()?;
        let mut events: Vec<DbEvent> = tables
            .events
            .values()
            .filter(|e| e.user_id == user_id && e.start_time_utc >= from && e.start_time_utc <= to)
            .map(|e| tables.with_attachment_flag(e))
            .collect();
        events.sort_by(|a, b| a.start_time_utc.cmp(&b.start_time_utc));

        Ok(events)
    }

    async fn get_events_by_user(&self, user_id: Uuid) -> Result<Vec<DbEvent>> {
        let tables = self.lock()?;
        let mut events: Vec<DbEvent> = tables
            .events
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| tables.with_attachment_flag(e))
            .collect();
        events.sort_by(|a, b| b.start_time_utc.cmp(&a.start_time_utc));

        Ok(events)
    }

    async fn delete_event(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut tables = self.lock()?;

        let owned = tables
            .events
            .get(&id)
            .is_some_and(|e| e.user_id == user_id);
        if !owned {
            return Ok(false);
        }

        tables.uploads.retain(|_, u| u.event_id != Some(id));
        tables.events.remove(&id);

        Ok(true)
    }

    async fn get_upload_by_event_id(&self, event_id: Uuid) -> Result<Option<DbUpload>> {
        Ok(self
            .lock()?
            .uploads
            .values()
            .find(|u| u.event_id == Some(event_id))
            .cloned())
    }
}
