//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! portal's plain-text notifications. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`]
//! returns `None` and the server falls back to
//! [`LogDelivery`](crate::LogDelivery).

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use portal_core::notify::{DispatchError, Notification, Notifier};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient, sender or reply-to address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

impl From<EmailError> for DispatchError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Transport(e) => DispatchError::Transport(e.to_string()),
            EmailError::Address(e) => DispatchError::Address(e.to_string()),
            EmailError::Build(msg) => DispatchError::Build(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "Research Portal <noreply@portal.local>";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" mailbox.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                                   |
    /// |-----------------|----------|-------------------------------------------|
    /// | `SMTP_HOST`     | yes      | -                                         |
    /// | `SMTP_PORT`     | no       | `587`                                     |
    /// | `SMTP_FROM`     | no       | `Research Portal <noreply@portal.local>`  |
    /// | `SMTP_USER`     | no       | -                                         |
    /// | `SMTP_PASSWORD` | no       | -                                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends portal notifications as plain-text email.
pub struct EmailDelivery {
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the SMTP transport. Fails if the sender address does not parse
    /// or the relay host is unusable.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            mailer: transport_builder.build(),
        })
    }

    /// Send a single notification.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), EmailError> {
        let email = build_message(&self.from, notification)?;
        self.mailer.send(email).await?;

        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "Notification email sent"
        );
        Ok(())
    }
}

/// Assemble the MIME message, including `Reply-To` when one is set.
fn build_message(from: &Mailbox, notification: &Notification) -> Result<Message, EmailError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .to(notification.to.parse()?)
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    if let Some(reply_to) = &notification.reply_to {
        builder = builder.reply_to(reply_to.parse()?);
    }
    builder
        .body(notification.body.clone())
        .map_err(|e| EmailError::Build(e.to_string()))
}

#[async_trait]
impl Notifier for EmailDelivery {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        Ok(self.deliver(notification).await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn sender() -> Mailbox {
        "Research Portal <noreply@portal.local>".parse().unwrap()
    }

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn address_errors_map_to_dispatch_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err: DispatchError = EmailError::Address(addr_err.unwrap_err()).into();
        assert_matches!(err, DispatchError::Address(_));
    }

    #[test]
    fn message_carries_reply_to() {
        let n = Notification::new("iot.lab@portal.local", "Lab Request", "Body")
            .with_reply_to("stu@uni.edu");
        let message = build_message(&sender(), &n).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Reply-To: stu@uni.edu"));
        assert!(raw.contains("To: iot.lab@portal.local"));
    }

    #[test]
    fn malformed_recipient_rejected() {
        let n = Notification::new("nobody", "Subject", "Body");
        assert_matches!(build_message(&sender(), &n), Err(EmailError::Address(_)));
    }
}
