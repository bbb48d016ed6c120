//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the planner API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3001)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: Secret key used to sign login tokens (required)
//! - `JWT_TTL_MINUTES`: Lifetime of a login token (default: 60)
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `PICTURES_DIR`: Directory profile pictures are written to (default: "pictures")
//! - `PUBLIC_BASE_URL`: Externally visible base URL used for picture links
//!   (default: "http://localhost:3001")
//! - `MAX_UPLOAD_BYTES`: Request body limit for uploads (default: 10 MiB)
//! - `MAIL_API_URL`: HTTP mail relay endpoint; mails are only logged when unset
//! - `MAIL_API_KEY`: Bearer token for the mail relay (optional)
//! - `MAIL_FROM`: Sender address (default: "no-reply@hereiam.local")

use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the planner API server
///
/// Built once at startup and passed to [`crate::ApiState::new`]; nothing in
/// the server reads the environment after that.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Secret used to sign and verify login tokens
    pub jwt_secret: String,

    /// Absolute lifetime of a login token, in minutes
    pub jwt_ttl_minutes: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Directory profile pictures are stored in and served from
    pub pictures_dir: String,

    /// Base URL clients use to reach this server
    pub public_base_url: String,

    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,

    /// Outbound mail settings
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// HTTP relay endpoint; `None` means mails are logged instead of sent
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL or JWT_SECRET environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - JWT_TTL_MINUTES or MAX_UPLOAD_BYTES is not a positive number
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_default());

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Security settings
        let jwt_secret = env::var("JWT_SECRET")
            .wrap_err("JWT_SECRET environment variable must be set")?;
        let jwt_ttl_minutes = env::var("JWT_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<i64>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| eyre::eyre!("JWT_TTL_MINUTES must be a positive number of minutes"))?;

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Storage settings
        let pictures_dir = env::var("PICTURES_DIR").unwrap_or_else(|_| "pictures".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse::<usize>()
            .ok()
            .filter(|bytes| *bytes > 0)
            .ok_or_else(|| eyre::eyre!("MAX_UPLOAD_BYTES must be a positive number"))?;

        // Mail settings
        let mail = MailConfig {
            api_url: env::var("MAIL_API_URL").ok().filter(|url| !url.is_empty()),
            api_key: env::var("MAIL_API_KEY").ok().filter(|key| !key.is_empty()),
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@hereiam.local".to_string()),
        };

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            jwt_ttl_minutes,
            request_timeout,
            pictures_dir,
            public_base_url,
            max_upload_bytes,
            mail,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL prefix profile picture filenames are appended to
    pub fn pictures_base_url(&self) -> String {
        format!("{}/pictures", self.public_base_url.trim_end_matches('/'))
    }
}

/// Maps a `LOG_LEVEL` value to a tracing level, defaulting to INFO.
pub fn parse_log_level(value: &str) -> Level {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
