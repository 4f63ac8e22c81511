use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shared_config::{AppConfig, MailConfig};
use shared_models::error::AppError;

use crate::models::OutgoingEmail;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Could not issue activation token: {0}")]
    Token(String),
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Posts `{from, to, subject, html}` to an HTTP mail relay.
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let body = json!({
            "from": self.from,
            "to": email.to,
            "subject": email.subject,
            "html": email.html,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Mail relay accepted message");
        Ok(())
    }
}

/// Stand-in used when no relay is configured: the message only reaches the logs.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "Mail relay not configured, email not sent");
        debug!("{}", email.html);
        Ok(())
    }
}

pub fn mailer_from_config(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(mail)),
        None => {
            warn!("MAIL_API_URL not set, activation emails will only be logged");
            Arc::new(LogMailer)
        }
    }
}
