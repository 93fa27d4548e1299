pub mod admin;
pub mod collaboration;
pub mod lab;
pub mod project;

use portal_core::status::ApprovalStatus;
use serde::Deserialize;

/// Request body for every `PUT .../status` route.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ApprovalStatus,
}
