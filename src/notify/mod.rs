//! # Notification
//!
//! Outbound messages sent after a submission is accepted.
//!
//! Delivery is best effort: the submission lifecycle logs notifier errors
//! and never surfaces them to the submitter.

mod receipt;
mod smtp;

pub use receipt::submission_receipt;
pub use smtp::{EmailConfig, SmtpNotifier};

use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("No async runtime available to deliver mail")]
    NoRuntime,

    #[error("Notifier unavailable: {0}")]
    Unavailable(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notifier trait for abstraction
pub trait Notifier: Send + Sync {
    /// Hand a message off for delivery
    fn send(&self, notification: Notification) -> NotifyResult<()>;
}

/// Notifier used when no SMTP server is configured.
///
/// Messages are logged and dropped; nothing is kept in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn send(&self, notification: Notification) -> NotifyResult<()> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "notification (not delivered, no SMTP configured)"
        );
        Ok(())
    }
}

/// Mock notifier for testing
#[derive(Debug, Default)]
pub struct MockNotifier {
    /// Sent messages, oldest first
    sent: RwLock<Vec<Notification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages handed to this notifier
    pub fn sent_count(&self) -> usize {
        self.sent.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Copy of every recorded message
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for MockNotifier {
    fn send(&self, notification: Notification) -> NotifyResult<()> {
        self.sent
            .write()
            .map_err(|_| NotifyError::Unavailable("Lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

/// Create a notifier based on config
pub fn create_notifier(config: Option<EmailConfig>) -> Arc<dyn Notifier> {
    match config {
        Some(cfg) => Arc::new(SmtpNotifier::new(cfg)),
        None => Arc::new(LogNotifier::new()),
    }
}
