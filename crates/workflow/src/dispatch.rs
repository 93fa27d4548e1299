//! Best-effort notification delivery.
//!
//! Called only after the triggering state change has been persisted. A
//! failed send is logged and reported as `false`; it is never turned into a
//! workflow error.

use futures::future::join_all;
use portal_core::notify::{Notification, Notifier};

/// Send one notification, swallowing any dispatch error.
pub async fn deliver(notifier: &dyn Notifier, notification: Notification) -> bool {
    match notifier.send(&notification).await {
        Ok(()) => {
            tracing::debug!(
                to = %notification.to,
                subject = %notification.subject,
                "Notification dispatched"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                to = %notification.to,
                subject = %notification.subject,
                error = %e,
                "Notification dispatch failed, ignoring"
            );
            false
        }
    }
}

/// Send notifications concurrently. Returns how many were delivered.
pub async fn deliver_all(notifier: &dyn Notifier, notifications: Vec<Notification>) -> usize {
    join_all(
        notifications
            .into_iter()
            .map(|notification| deliver(notifier, notification)),
    )
    .await
    .into_iter()
    .filter(|delivered| *delivered)
    .count()
}
