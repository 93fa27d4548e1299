//! Tracing-only delivery for deployments without SMTP.

use async_trait::async_trait;
use portal_core::notify::{DispatchError, Notification, Notifier};

/// Records each notification as a structured log event and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDelivery;

impl LogDelivery {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogDelivery {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        tracing::info!(
            to = %notification.to,
            reply_to = notification.reply_to.as_deref().unwrap_or("-"),
            subject = %notification.subject,
            body_len = notification.body.len(),
            "Notification logged (SMTP not configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_succeeds() {
        let n = Notification::new("a@uni.edu", "Subject", "Body");
        assert!(LogDelivery::new().send(&n).await.is_ok());
    }
}
