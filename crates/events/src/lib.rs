//! Notification delivery channels for the research portal.
//!
//! Both channels implement [`portal_core::notify::Notifier`]:
//!
//! - [`EmailDelivery`] sends plain-text mail over SMTP.
//! - [`LogDelivery`] only writes a tracing event; selected when SMTP is not
//!   configured.

pub mod delivery;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::log::LogDelivery;
