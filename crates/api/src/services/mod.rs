//! Business logic behind the handlers.
//!
//! Every function takes the shared [`crate::ApiState`] and, for protected
//! operations, the [`crate::middleware::auth::AuthUser`] bound to the request
//! token. Functions return [`planner_core::errors::PlannerResult`] so they can
//! be exercised without HTTP.

pub mod auth;
pub mod events;
pub mod users;

use std::future::Future;

use tracing::warn;

/// A file received from a client, before intake validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Awaits a notification and swallows its failure.
///
/// Notifications are side effects of a request that already succeeded, so a
/// failing mail relay is logged and never reaches the client.
pub(crate) async fn dispatch<T>(
    kind: &str,
    recipient: &str,
    notification: impl Future<Output = eyre::Result<T>>,
) -> Option<T> {
    match notification.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(kind, recipient, "Notification failed: {:#}", e);
            None
        }
    }
}
