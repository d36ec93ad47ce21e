//! SMTP delivery through lettre

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use super::{Notification, Notifier, NotifyError, NotifyResult};

/// Email configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP server host
    pub smtp_host: String,

    /// SMTP server port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username; empty disables authentication
    #[serde(default)]
    pub smtp_user: String,

    /// SMTP password (should come from secrets)
    #[serde(default)]
    pub smtp_password: String,

    /// From email address
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Formsmith".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@formsmith.local".to_string(),
            from_name: default_from_name(),
        }
    }
}

/// SMTP notifier.
///
/// `send` builds the message and spawns delivery on the current tokio
/// runtime; delivery failures are logged from the spawned task.
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, notification: &Notification) -> NotifyResult<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("from: {}", e)))?;
        let to: Mailbox = notification
            .to
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("to: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    fn transport(&self) -> NotifyResult<AsyncSmtpTransport<Tokio1Executor>> {
        if self.config.smtp_user.is_empty() {
            // No authentication (for local development SMTP servers)
            return Ok(
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
                    .port(self.config.smtp_port)
                    .build(),
            );
        }

        let creds = Credentials::new(
            self.config.smtp_user.clone(),
            self.config.smtp_password.clone(),
        );
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| NotifyError::Unavailable(format!("SMTP relay error: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build())
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, notification: Notification) -> NotifyResult<()> {
        let message = self.build_message(&notification)?;
        let handle = tokio::runtime::Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        // the pooled transport spawns onto the runtime, so enter it first
        let _guard = handle.enter();
        let mailer = self.transport()?;

        let to = notification.to;
        handle.spawn(async move {
            match mailer.send(message).await {
                Ok(_) => tracing::debug!(%to, "notification delivered"),
                Err(e) => tracing::warn!(%to, error = %e, "notification delivery failed"),
            }
        });
        Ok(())
    }
}
