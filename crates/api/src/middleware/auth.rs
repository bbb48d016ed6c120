//! # Authentication Module
//!
//! This module is the auth gate of the planner API:
//!
//! - Argon2 password hashing and verification
//! - Issuing signed, time-limited login tokens (HS256 JWT)
//! - The [`AuthUser`] extractor, which verifies the bearer token on every
//!   protected request and binds the acting identity
//!
//! Handlers must take the acting user from [`AuthUser`] only. Identity fields
//! sent in request bodies are never used for authorization.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use eyre::Result;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use planner_core::errors::PlannerError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password using the Argon2 algorithm
///
/// A fresh random salt is generated for every call and the result is returned
/// in PHC string format (algorithm, version, parameters, salt and hash).
///
/// # Example
///
/// ```rust
/// use planner_api::middleware::auth::hash_password;
///
/// let hashed = hash_password("user_password").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a plain text password against a stored PHC hash
///
/// Argon2 compares the derived hash in constant time. An unparseable stored
/// hash is an error rather than a mismatch.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Claims carried by a login token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Absolute expiry, seconds since the epoch
    pub exp: i64,
}

/// The identity bound to a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Signs and verifies login tokens with a secret injected at startup
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issues a token expiring `ttl` after now. Expiry is not extended by use.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| eyre::eyre!("Error signing token: {}", e))
    }

    /// Verifies a token and returns the identity it was issued for.
    pub fn verify(&self, token: &str) -> Result<AuthUser, PlannerError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token has expired",
                ErrorKind::InvalidSignature => "Token signature is invalid",
                _ => "Token is malformed",
            };
            tracing::debug!("Rejected token: {}", e);
            PlannerError::Unauthorized(reason.to_string())
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| PlannerError::Unauthorized("Token is malformed".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: data.claims.username,
        })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| PlannerError::Unauthorized("Missing bearer token".to_string()))?;

        Ok(state.tokens.verify(token)?)
    }
}
