//! Entity store seam.
//!
//! The workflow managers own no storage engine. They issue operations
//! through these traits, which are implemented by the PostgreSQL adapter in
//! `portal-db` and by the in-memory adapter in `portal-workflow`.
//!
//! Listing operations return newest first unless stated otherwise.

use async_trait::async_trait;

use crate::collaboration::{Collaboration, Milestone, NewCollaboration, NewMilestone};
use crate::error::StoreResult;
use crate::lab_booking::{LabBooking, NewLabBooking};
use crate::labs::SlotKey;
use crate::project::{NewProject, Project, Revision};
use crate::status::ApprovalStatus;
use crate::types::DbId;

/// Predicate for project listings. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub owner_id: Option<DbId>,
    pub approver_id: Option<DbId>,
    pub limit: Option<i64>,
}

/// Predicate for booking listings. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingFilter {
    pub owner_id: Option<DbId>,
    pub status: Option<ApprovalStatus>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a project at version 1 with empty history.
    async fn insert_project(&self, input: &NewProject) -> StoreResult<Project>;

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>>;

    /// Persist a mutated project, provided the stored row still matches
    /// `expected`, the revision the caller loaded.
    ///
    /// Returns `None` when another writer got there first. History entries
    /// already stored are never rewritten; entries whose version is not yet
    /// stored are appended.
    async fn save_project(
        &self,
        project: &Project,
        expected: &Revision,
    ) -> StoreResult<Option<Project>>;

    /// Permanently delete a project and its history.
    async fn delete_project(&self, id: DbId) -> StoreResult<bool>;

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;
}

#[async_trait]
pub trait LabBookingStore: Send + Sync {
    /// Insert a booking with status `Pending`.
    async fn insert_booking(&self, input: &NewLabBooking) -> StoreResult<LabBooking>;

    async fn find_booking(&self, id: DbId) -> StoreResult<Option<LabBooking>>;

    /// The approved booking holding `key`, if any.
    async fn find_approved_booking(&self, key: &SlotKey) -> StoreResult<Option<LabBooking>>;

    /// Move a `Pending` booking to `status`.
    ///
    /// Returns `None` when the booking is no longer `Pending`. Approving a
    /// booking whose slot is already held by another approved booking fails
    /// with [`StoreError::Conflict`](crate::error::StoreError::Conflict).
    async fn update_booking_status(
        &self,
        id: DbId,
        status: ApprovalStatus,
    ) -> StoreResult<Option<LabBooking>>;

    async fn delete_booking(&self, id: DbId) -> StoreResult<bool>;

    /// Delete every listed booking that is owned by `owner_id` and still
    /// `Pending`, in one operation. Returns the number removed.
    async fn delete_pending_bookings(&self, owner_id: DbId, ids: &[DbId]) -> StoreResult<u64>;

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<LabBooking>>;
}

#[async_trait]
pub trait CollaborationStore: Send + Sync {
    /// Insert a proposal with status `Pending`.
    async fn insert_collaboration(&self, input: &NewCollaboration) -> StoreResult<Collaboration>;

    async fn find_collaboration(&self, id: DbId) -> StoreResult<Option<Collaboration>>;

    /// Move a `Pending` collaboration to `status`.
    ///
    /// Returns `None` when the record is no longer `Pending`, so two racing
    /// resolutions produce exactly one state change.
    async fn resolve_collaboration(
        &self,
        id: DbId,
        status: ApprovalStatus,
    ) -> StoreResult<Option<Collaboration>>;

    /// Collaborations whose sender or receiver email equals `email`.
    async fn list_collaborations_for(&self, email: &str) -> StoreResult<Vec<Collaboration>>;

    /// Collaborations whose receiver email equals `email`.
    async fn list_incoming_collaborations(&self, email: &str) -> StoreResult<Vec<Collaboration>>;
}

#[async_trait]
pub trait MilestoneStore: Send + Sync {
    async fn insert_milestone(&self, input: &NewMilestone) -> StoreResult<Milestone>;

    /// Milestones for a collaboration, oldest first.
    async fn list_milestones(&self, collaboration_id: DbId) -> StoreResult<Vec<Milestone>>;
}

/// Every collection the workflow engine needs, behind one object.
#[async_trait]
pub trait PortalStore:
    ProjectStore + LabBookingStore + CollaborationStore + MilestoneStore + Send + Sync
{
    /// Check that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
