use async_trait::async_trait;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::UserRepository;
use crate::models::{DbUser, NewUser, ProfileChanges, ProfileUpdate};

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

const USER_COLUMNS: &str =
    "id, name, surname, username, email, password_hash, profile_picture, created_at";

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        tracing::debug!("Creating user: id={}, username={}", id, user.username);

        let sql = format!(
            r#"
            INSERT INTO users (id, name, surname, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .bind(&user.name)
            .bind(&user.surname)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        if created.is_none() {
            tracing::debug!("Username or email already taken: username={}", user.username);
        }

        Ok(created)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<DbUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user_by_credential(&self, credential: &str) -> Result<Option<DbUser>> {
        // An exact username match wins over an email match.
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 OR email = lower($1)
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#
        );
        let user = sqlx::query_as::<_, DbUser>(&sql)
            .bind(credential)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = lower($1)");
        let user = sqlx::query_as::<_, DbUser>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<ProfileUpdate> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                surname = COALESCE($3, surname),
                email = COALESCE($4, email),
                profile_picture = COALESCE($5, profile_picture)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.surname.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.profile_picture.as_deref())
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(user)) => Ok(ProfileUpdate::Updated(user)),
            Ok(None) => Ok(ProfileUpdate::UserNotFound),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                tracing::debug!("Profile update rejected, email taken: id={}", id);
                Ok(ProfileUpdate::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_profile_picture(&self, id: Uuid, filename: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET profile_picture = $2 WHERE id = $1")
            .bind(id)
            .bind(filename)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
