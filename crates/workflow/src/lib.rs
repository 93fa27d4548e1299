//! Request-approval workflow engine.
//!
//! Three managers drive the portal's state machines:
//!
//! - [`ProjectLifecycle`]: submission, owner amendments with version
//!   history, reviewer decisions, deletion.
//! - [`LabAllocator`]: slot requests, conflict detection on approval,
//!   single and batch withdrawal.
//! - [`CollaborationMatcher`]: proposals matched by email, one-shot
//!   resolution, directives and the milestone log.
//!
//! [`PortalAnalytics`] summarises the portal for the principal. Every manager
//! persists through a [`PortalStore`](portal_core::store::PortalStore) and
//! notifies through a [`Notifier`](portal_core::notify::Notifier); dispatch
//! failures are logged by [`dispatch`] and never fail the operation.

pub mod analytics;
pub mod collaboration;
pub mod dispatch;
pub mod lab;
pub mod memory;
pub mod messages;
pub mod project;

pub use analytics::{PortalAnalytics, PortalSummary};
pub use collaboration::{CollaborationMatcher, DirectiveReceipt};
pub use lab::{LabAllocator, WithdrawalSummary};
pub use memory::{InMemoryStore, RecordingNotifier};
pub use project::ProjectLifecycle;
