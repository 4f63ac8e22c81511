use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use shared_models::auth::ActivationClaims;
use shared_utils::{TokenService, ACTIVATION_TOKEN_TTL};

use crate::models::{NewAccountNotice, OutgoingEmail};
use crate::services::mailer::{MailError, Mailer};
use crate::services::templates::{activation_link, signup_html, SIGNUP_SUBJECT};

/// Sending half handed to the account flows. Never blocks and never fails
/// the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<NewAccountNotice>,
}

impl NotificationDispatcher {
    pub fn new(sender: mpsc::UnboundedSender<NewAccountNotice>) -> Self {
        Self { sender }
    }

    pub fn notify_new_account(&self, notice: NewAccountNotice) {
        debug!("Queueing activation email for new {} account", notice.kind);

        if let Err(mpsc::error::SendError(notice)) = self.sender.send(notice) {
            error!(
                "Notification worker is not running, activation email for {} dropped",
                notice.email
            );
        }
    }
}

pub struct NotificationWorker {
    receiver: mpsc::UnboundedReceiver<NewAccountNotice>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<NewAccountNotice>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        base_url: String,
    ) -> Self {
        Self {
            receiver,
            tokens,
            mailer,
            base_url,
        }
    }

    /// Drains the queue until every dispatcher has been dropped.
    pub async fn run(mut self) {
        info!("Notification worker started");

        while let Some(notice) = self.receiver.recv().await {
            if let Err(e) = self.deliver(&notice).await {
                error!("Failed to send activation email to {}: {}", notice.email, e);
            }
        }

        info!("Notification worker stopped");
    }

    #[instrument(skip(self, notice), fields(kind = %notice.kind))]
    async fn deliver(&self, notice: &NewAccountNotice) -> Result<(), MailError> {
        let claims = ActivationClaims {
            email: notice.email.clone(),
        };
        let token = self
            .tokens
            .issue(&claims, ACTIVATION_TOKEN_TTL)
            .map_err(|e| MailError::Token(e.to_string()))?;

        let link = activation_link(&self.base_url, notice.kind, &token);
        let email = OutgoingEmail {
            to: notice.email.clone(),
            subject: SIGNUP_SUBJECT.to_string(),
            html: signup_html(&notice.name, &link),
        };

        self.mailer.send(&email).await?;
        info!("Activation email sent");
        Ok(())
    }
}

pub fn spawn_notification_worker(
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
) -> (NotificationDispatcher, JoinHandle<()>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let worker = NotificationWorker::new(receiver, tokens, mailer, base_url);
    let handle = tokio::spawn(worker.run());

    (NotificationDispatcher::new(sender), handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::MockMailer;
    use shared_models::identity::AccountKind;

    const SECRET: &str = "test-secret-key-for-token-validation";

    fn notice(kind: AccountKind, email: &str) -> NewAccountNotice {
        NewAccountNotice {
            kind,
            email: email.to_string(),
            name: "Ahmed".to_string(),
        }
    }

    fn token_from_link(html: &str, prefix: &str) -> String {
        let start = html.find(prefix).map(|i| i + prefix.len()).unwrap();
        html[start..].split('"').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_worker_sends_activation_email_with_valid_token() {
        let tokens = Arc::new(TokenService::new(SECRET));
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email: &OutgoingEmail| {
                email.to == "a@x.com"
                    && email.subject == "Confirm your email"
                    && email.html.contains("Welcome, Ahmed!")
                    && email.html.contains("http://localhost:3000/doctor/activate_account/")
            })
            .times(1)
            .returning(|email| {
                let token = token_from_link(&email.html, "/doctor/activate_account/");
                let claims: ActivationClaims = TokenService::new(SECRET).verify(&token).unwrap();
                assert_eq!(claims.email, "a@x.com");
                Ok(())
            });

        let (dispatcher, handle) =
            spawn_notification_worker(tokens, Arc::new(mailer), "http://localhost:3000".into());
        dispatcher.notify_new_account(notice(AccountKind::Doctor, "a@x.com"));
        drop(dispatcher);

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_stop_the_worker() {
        let tokens = Arc::new(TokenService::new(SECRET));
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email: &OutgoingEmail| email.to == "first@x.com")
            .times(1)
            .returning(|_| Err(MailError::Rejected { status: 500, body: "down".into() }));
        mailer
            .expect_send()
            .withf(|email: &OutgoingEmail| email.to == "second@x.com")
            .times(1)
            .returning(|_| Ok(()));

        let (dispatcher, handle) =
            spawn_notification_worker(tokens, Arc::new(mailer), "http://localhost:3000".into());
        dispatcher.notify_new_account(notice(AccountKind::Patient, "first@x.com"));
        dispatcher.notify_new_account(notice(AccountKind::Patient, "second@x.com"));
        drop(dispatcher);

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_notify_after_worker_gone_is_silent() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);

        NotificationDispatcher::new(sender).notify_new_account(notice(AccountKind::Patient, "a@x.com"));
    }
}
