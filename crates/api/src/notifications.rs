//! # Email Notifications
//!
//! [`EmailNotifier`] implements the [`Notifier`] contract on top of one of two
//! transports: an HTTP mail relay reached with `reqwest`, or the log when no
//! relay is configured (local development and tests). The log transport
//! refuses password resets, since a reset nobody receives locks the user out.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::{eyre, Result};
use planner_core::{
    credentials::{generate_password, GENERATED_PASSWORD_LEN},
    notify::{
        event_created_message, forgot_password_message, sign_up_message, MailMessage, Notifier,
    },
};
use serde::Serialize;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Clone)]
enum Transport {
    Http {
        client: reqwest::Client,
        url: String,
        api_key: Option<String>,
    },
    Log,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct EmailNotifier {
    from: String,
    transport: Transport,
}

impl EmailNotifier {
    pub fn from_config(config: &MailConfig) -> Self {
        let transport = match &config.api_url {
            Some(url) => Transport::Http {
                client: reqwest::Client::new(),
                url: url.clone(),
                api_key: config.api_key.clone(),
            },
            None => Transport::Log,
        };

        Self {
            from: config.from.clone(),
            transport,
        }
    }

    /// A notifier that only logs, for development without a relay.
    pub fn logging(from: &str) -> Self {
        Self {
            from: from.to_string(),
            transport: Transport::Log,
        }
    }

    async fn deliver(&self, message: &MailMessage) -> Result<()> {
        match &self.transport {
            Transport::Http {
                client,
                url,
                api_key,
            } => {
                let mut request = client.post(url).json(&RelayRequest {
                    from: &self.from,
                    to: &message.to,
                    subject: &message.subject,
                    text: &message.body,
                });
                if let Some(key) = api_key {
                    request = request.bearer_auth(key);
                }

                let response = request.send().await?;
                if !response.status().is_success() {
                    let status = response.status();
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(eyre!("Mail relay rejected message ({}): {}", status, error_text));
                }

                info!(to = %message.to, subject = %message.subject, "Email sent");
            }
            Transport::Log => {
                info!(
                    from = %self.from,
                    to = %message.to,
                    subject = %message.subject,
                    "Email not sent, no mail relay configured"
                );
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn on_sign_up(&self, email: &str) -> Result<()> {
        self.deliver(&sign_up_message(email)).await
    }

    /// Without a relay the password would never reach the user, so no reset
    /// is offered.
    async fn on_forgot_password(&self, email: &str) -> Result<String> {
        if matches!(self.transport, Transport::Log) {
            return Err(eyre!("No mail relay configured, password reset for {} skipped", email));
        }

        let new_password = generate_password(GENERATED_PASSWORD_LEN);
        self.deliver(&forgot_password_message(email, &new_password))
            .await?;
        Ok(new_password)
    }

    async fn on_event_created(
        &self,
        email: &str,
        title: &str,
        description: &str,
        start_time: NaiveDateTime,
        importance: i32,
    ) -> Result<()> {
        self.deliver(&event_created_message(
            email,
            title,
            description,
            start_time,
            importance,
        ))
        .await
    }
}
