//! # Planner API
//!
//! The API crate provides the web server for the personal planner: user
//! accounts, calendar events with attachments, profile pictures and the email
//! side effects tied to them.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Extract requests and shape responses
//! - **Services**: Validation, authorization and side-effect orchestration
//! - **Middleware**: Authentication and error handling
//! - **Config**: Environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Outbound email notifications
pub mod notifications;
/// Profile picture storage
pub mod pictures;
/// Route definitions and API endpoint structure
pub mod routes;
/// Business logic shared by the handlers
pub mod services;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use eyre::Result;
use planner_core::notify::Notifier;
use planner_db::{
    repositories::{
        event::PgEventRepository, user::PgUserRepository, EventRepository, UserRepository,
    },
    DbPool,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::{
    config::ApiConfig, middleware::auth::TokenIssuer, notifications::EmailNotifier,
    pictures::PictureStore,
};

/// Shared application state that is accessible to all request handlers
///
/// Everything a handler needs is constructed at startup and injected here;
/// there is no process-wide mutable state.
pub struct ApiState {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub tokens: TokenIssuer,
    pub pictures: PictureStore,
    /// URL prefix prepended to stored profile picture filenames
    pub pictures_base_url: String,
    pub max_upload_bytes: usize,
}

impl ApiState {
    /// Builds the production state: PostgreSQL repositories and the
    /// configured mail transport.
    pub fn new(config: &ApiConfig, db_pool: DbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db_pool.clone())),
            events: Arc::new(PgEventRepository::new(db_pool)),
            notifier: Arc::new(EmailNotifier::from_config(&config.mail)),
            tokens: TokenIssuer::new(
                &config.jwt_secret,
                chrono::Duration::minutes(config.jwt_ttl_minutes),
            ),
            pictures: PictureStore::new(&config.pictures_dir),
            pictures_base_url: config.pictures_base_url(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Builds the application router with all routes, static picture serving,
/// the upload size limit and request tracing.
pub fn build_router(state: Arc<ApiState>) -> Router {
    let pictures = ServeDir::new(state.pictures.dir());
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Login, registration and password reset
        .merge(routes::auth::routes())
        // Profile management endpoints
        .merge(routes::users::routes())
        // Event lifecycle endpoints
        .merge(routes::events::routes())
        // Attach shared state to all routes
        .with_state(state)
        // Uploaded profile pictures, no auth
        .nest_service("/pictures", pictures)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
}

/// Starts the API server with the provided configuration and database connection
///
/// Initializes logging, builds the state and router, applies CORS and the
/// request timeout, and serves until the process is stopped.
pub async fn start_server(config: ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if config.mail.api_url.is_none() {
        warn!("MAIL_API_URL is not set, notification emails will only be logged");
    }

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(&config, db_pool));
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
