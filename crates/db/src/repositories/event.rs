use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::EventRepository;
use crate::models::{DbEvent, DbUpload, NewEvent, NewUpload};

const SELECT_EVENTS: &str = r#"
    SELECT e.id, e.user_id, e.title, e.description, e.start_time_utc, e.end_time_utc,
           e.importance, e.created_at,
           EXISTS (SELECT 1 FROM uploads u WHERE u.event_id = e.id) AS has_attachment
    FROM events e
"#;

#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: Pool<Postgres>,
}

impl PgEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create_event(&self, event: &NewEvent, upload: Option<NewUpload>) -> Result<DbEvent> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        tracing::debug!(
            "Creating event: id={}, user_id={}, start={}, has_upload={}",
            id, event.user_id, event.start_time_utc, upload.is_some()
        );

        // Dropping the transaction on an early return rolls both inserts back.
        let mut tx = self.pool.begin().await?;

        let mut created = sqlx::query_as::<_, DbEvent>(
            r#"
            INSERT INTO events (id, user_id, title, description, start_time_utc, end_time_utc, importance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, description, start_time_utc, end_time_utc,
                      importance, created_at, FALSE AS has_attachment
            "#,
        )
        .bind(id)
        .bind(event.user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time_utc)
        .bind(event.end_time_utc)
        .bind(event.importance)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(upload) = upload {
            sqlx::query(
                r#"
                INSERT INTO uploads (id, filename, filedata, user_id, event_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&upload.filename)
            .bind(&upload.filedata)
            .bind(event.user_id)
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            created.has_attachment = true;
        }

        tx.commit().await?;

        tracing::debug!("Event created successfully: id={}", id);
        Ok(created)
    }

    async fn get_event_by_id(&self, id: Uuid) -> Result<Option<DbEvent>> {
        let sql = format!("{SELECT_EVENTS} WHERE e.id = $1");
        let event = sqlx::query_as::<_, DbEvent>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn get_events_between(
        &self,
        user_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<DbEvent>> {
        let sql = format!(
            "{SELECT_EVENTS} WHERE e.user_id = $1 AND e.start_time_utc BETWEEN $2 AND $3 \
             ORDER BY e.start_time_utc ASC"
        );
        let events = sqlx::query_as::<_, DbEvent>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn get_events_by_user(&self, user_id: Uuid) -> Result<Vec<DbEvent>> {
        let sql = format!("{SELECT_EVENTS} WHERE e.user_id = $1 ORDER BY e.start_time_utc DESC");
        let events = sqlx::query_as::<_, DbEvent>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn delete_event(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM events WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        // Uploads reference the event, so they go first.
        let uploads = sqlx::query("DELETE FROM uploads WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Event deleted: id={}, uploads_removed={}",
            id,
            uploads.rows_affected()
        );
        Ok(true)
    }

    async fn get_upload_by_event_id(&self, event_id: Uuid) -> Result<Option<DbUpload>> {
        let upload = sqlx::query_as::<_, DbUpload>(
            r#"
            SELECT id, filename, filedata, user_id, event_id, created_at
            FROM uploads
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(upload)
    }
}
