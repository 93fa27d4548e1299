//! PostgreSQL implementation of the `portal-core` store traits.

use std::collections::HashMap;

use async_trait::async_trait;
use portal_core::collaboration::{Collaboration, Milestone, NewCollaboration, NewMilestone};
use portal_core::error::{StoreError, StoreResult};
use portal_core::lab_booking::{LabBooking, NewLabBooking};
use portal_core::labs::SlotKey;
use portal_core::project::{NewProject, Project, Revision};
use portal_core::status::ApprovalStatus;
use portal_core::store::{
    BookingFilter, CollaborationStore, LabBookingStore, MilestoneStore, PortalStore, ProjectFilter,
    ProjectStore,
};
use portal_core::types::DbId;

use crate::models::project::{ProjectHistoryRow, ProjectRow};
use crate::repositories::{
    CollaborationRepo, LabBookingRepo, MilestoneRepo, ProjectHistoryRepo, ProjectRepo,
};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error into the store taxonomy.
///
/// Unique violations on `uq_` constraints become [`StoreError::Conflict`];
/// everything else is a backend error.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return StoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Load history for every row in one query and assemble projects.
    async fn assemble(&self, rows: Vec<ProjectRow>) -> StoreResult<Vec<Project>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut history: HashMap<DbId, Vec<ProjectHistoryRow>> = HashMap::new();
        for entry in ProjectHistoryRepo::list_for_projects(&self.pool, &ids)
            .await
            .map_err(store_error)?
        {
            history.entry(entry.project_id).or_default().push(entry);
        }
        rows.into_iter()
            .map(|row| {
                let entries = history.remove(&row.id).unwrap_or_default();
                row.into_project(entries)
            })
            .collect()
    }

    async fn assemble_one(&self, row: ProjectRow) -> StoreResult<Project> {
        let history = ProjectHistoryRepo::list_for_project(&self.pool, row.id)
            .await
            .map_err(store_error)?;
        row.into_project(history)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn insert_project(&self, input: &NewProject) -> StoreResult<Project> {
        let row = ProjectRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?;
        row.into_project(Vec::new())
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        match ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
        {
            Some(row) => Ok(Some(self.assemble_one(row).await?)),
            None => Ok(None),
        }
    }

    async fn save_project(
        &self,
        project: &Project,
        expected: &Revision,
    ) -> StoreResult<Option<Project>> {
        match ProjectRepo::save(&self.pool, project, expected)
            .await
            .map_err(store_error)?
        {
            Some(row) => Ok(Some(self.assemble_one(row).await?)),
            None => Ok(None),
        }
    }

    async fn delete_project(&self, id: DbId) -> StoreResult<bool> {
        ProjectRepo::delete(&self.pool, id)
            .await
            .map_err(store_error)
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let rows = ProjectRepo::list(&self.pool, filter)
            .await
            .map_err(store_error)?;
        self.assemble(rows).await
    }
}

#[async_trait]
impl LabBookingStore for PgStore {
    async fn insert_booking(&self, input: &NewLabBooking) -> StoreResult<LabBooking> {
        LabBookingRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?
            .try_into()
    }

    async fn find_booking(&self, id: DbId) -> StoreResult<Option<LabBooking>> {
        LabBookingRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(LabBooking::try_from)
            .transpose()
    }

    async fn find_approved_booking(&self, key: &SlotKey) -> StoreResult<Option<LabBooking>> {
        LabBookingRepo::find_approved_for_slot(&self.pool, key)
            .await
            .map_err(store_error)?
            .map(LabBooking::try_from)
            .transpose()
    }

    async fn update_booking_status(
        &self,
        id: DbId,
        status: ApprovalStatus,
    ) -> StoreResult<Option<LabBooking>> {
        LabBookingRepo::update_status(&self.pool, id, status.id())
            .await
            .map_err(store_error)?
            .map(LabBooking::try_from)
            .transpose()
    }

    async fn delete_booking(&self, id: DbId) -> StoreResult<bool> {
        LabBookingRepo::delete(&self.pool, id)
            .await
            .map_err(store_error)
    }

    async fn delete_pending_bookings(&self, owner_id: DbId, ids: &[DbId]) -> StoreResult<u64> {
        LabBookingRepo::delete_pending_owned(&self.pool, owner_id, ids)
            .await
            .map_err(store_error)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<LabBooking>> {
        LabBookingRepo::list(&self.pool, filter)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(LabBooking::try_from)
            .collect()
    }
}

#[async_trait]
impl CollaborationStore for PgStore {
    async fn insert_collaboration(&self, input: &NewCollaboration) -> StoreResult<Collaboration> {
        CollaborationRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?
            .try_into()
    }

    async fn find_collaboration(&self, id: DbId) -> StoreResult<Option<Collaboration>> {
        CollaborationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(Collaboration::try_from)
            .transpose()
    }

    async fn resolve_collaboration(
        &self,
        id: DbId,
        status: ApprovalStatus,
    ) -> StoreResult<Option<Collaboration>> {
        CollaborationRepo::resolve_pending(&self.pool, id, status.id())
            .await
            .map_err(store_error)?
            .map(Collaboration::try_from)
            .transpose()
    }

    async fn list_collaborations_for(&self, email: &str) -> StoreResult<Vec<Collaboration>> {
        CollaborationRepo::list_for_email(&self.pool, email)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Collaboration::try_from)
            .collect()
    }

    async fn list_incoming_collaborations(&self, email: &str) -> StoreResult<Vec<Collaboration>> {
        CollaborationRepo::list_incoming(&self.pool, email)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Collaboration::try_from)
            .collect()
    }
}

#[async_trait]
impl MilestoneStore for PgStore {
    async fn insert_milestone(&self, input: &NewMilestone) -> StoreResult<Milestone> {
        MilestoneRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?
            .try_into()
    }

    async fn list_milestones(&self, collaboration_id: DbId) -> StoreResult<Vec<Milestone>> {
        MilestoneRepo::list_for_collaboration(&self.pool, collaboration_id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Milestone::try_from)
            .collect()
    }
}

#[async_trait]
impl PortalStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}
