//! Persistence for the planner: the PostgreSQL schema, the repository traits
//! the API talks to, their SQL implementations and an in-memory store.

pub mod memory;
pub mod mock;
pub mod models;
pub mod repositories;
pub mod schema;

use std::time::Duration;

use eyre::{Result, WrapErr};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

pub type DbPool = Pool<Postgres>;

/// Opens the connection pool used by every repository.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to the planner database")?;

    info!("Database pool ready");
    Ok(pool)
}
