//! # Notifications
//!
//! Contract for the outbound email side effects of account and event
//! lifecycle transitions, plus the message templates every transport shares.
//! Callers treat every method as fire-and-forget: errors are logged and
//! dropped, never surfaced to the HTTP client.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Welcome mail sent after a successful registration.
    async fn on_sign_up(&self, email: &str) -> Result<()>;

    /// Generates a new password, mails it, and returns it once delivered.
    async fn on_forgot_password(&self, email: &str) -> Result<String>;

    async fn on_event_created(
        &self,
        email: &str,
        title: &str,
        description: &str,
        start_time: NaiveDateTime,
        importance: i32,
    ) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub fn sign_up_message(email: &str) -> MailMessage {
    MailMessage {
        to: email.to_string(),
        subject: "Here I Am: Sign Up".to_string(),
        body: "You have successfully signed up to Here I Am!\nWelcome aboard!".to_string(),
    }
}

pub fn forgot_password_message(email: &str, new_password: &str) -> MailMessage {
    MailMessage {
        to: email.to_string(),
        subject: "Here I Am: Forgot Password".to_string(),
        body: format!(
            "You have requested to reset your password.\n\
             Your password has been automatically changed to:\n\
             {new_password}\n\
             You can change this password in the profile section after you sign in again."
        ),
    }
}

pub fn event_created_message(
    email: &str,
    title: &str,
    description: &str,
    start_time: NaiveDateTime,
    importance: i32,
) -> MailMessage {
    let description = if description.is_empty() {
        "(no description)"
    } else {
        description
    };

    MailMessage {
        to: email.to_string(),
        subject: format!("Here I Am: New event \"{title}\""),
        body: format!(
            "A new event was added to your planner.\n\n\
             Title: {title}\n\
             When: {}\n\
             Importance: {importance}\n\
             Description: {description}",
            start_time.format("%Y-%m-%d %H:%M")
        ),
    }
}
