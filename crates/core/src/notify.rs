//! Notification dispatcher seam.
//!
//! Workflow managers hand a [`Notification`] to a [`Notifier`] after a state
//! change has been persisted. Delivery is best-effort: callers log a
//! [`DispatchError`] and carry on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A plain-text message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

impl Notification {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The recipient or sender address could not be used.
    #[error("Invalid address: {0}")]
    Address(String),

    /// The message could not be assembled.
    #[error("Message build error: {0}")]
    Build(String),

    /// The transport refused or failed the delivery.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Delivers notifications to recipients.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError>;
}
