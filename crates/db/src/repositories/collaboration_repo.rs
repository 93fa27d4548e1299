//! Repositories for the `collaborations` and `milestones` tables.

use portal_core::collaboration::{NewCollaboration, NewMilestone};
use portal_core::status::{ApprovalStatus, StatusId};
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::collaboration::{CollaborationRow, MilestoneRow};

// ---------------------------------------------------------------------------
// CollaborationRepo
// ---------------------------------------------------------------------------

/// Column list for `collaborations` queries.
const COLUMNS: &str = "id, sender_id, sender_name, sender_email, sender_role, \
                       sender_department, sender_enrollment, sender_designation, \
                       sender_achievements, sender_linkedin, receiver_email, \
                       project_title, project_domain, project_github_link, \
                       project_paper_link, project_description, message, status_id, \
                       created_at";

pub struct CollaborationRepo;

impl CollaborationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewCollaboration,
    ) -> Result<CollaborationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO collaborations \
                (sender_id, sender_name, sender_email, sender_role, sender_department, \
                 sender_enrollment, sender_designation, sender_achievements, \
                 sender_linkedin, receiver_email, project_title, project_domain, \
                 project_github_link, project_paper_link, project_description, message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        let sender = &input.sender;
        let project = &input.project;
        sqlx::query_as::<_, CollaborationRow>(&query)
            .bind(input.sender_id)
            .bind(&sender.name)
            .bind(&sender.email)
            .bind(&sender.role)
            .bind(&sender.department)
            .bind(&sender.enrollment)
            .bind(&sender.designation)
            .bind(&sender.achievements)
            .bind(&sender.linkedin)
            .bind(&input.receiver_email)
            .bind(&project.title)
            .bind(&project.domain)
            .bind(&project.github_link)
            .bind(&project.research_paper_link)
            .bind(&project.description)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CollaborationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM collaborations WHERE id = $1");
        sqlx::query_as::<_, CollaborationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a pending collaboration to `status_id`.
    ///
    /// The `status_id` guard in the `WHERE` clause makes this a
    /// compare-and-swap: `None` means the row was already resolved (or
    /// does not exist).
    pub async fn resolve_pending(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
    ) -> Result<Option<CollaborationRow>, sqlx::Error> {
        let query = format!(
            "UPDATE collaborations SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CollaborationRow>(&query)
            .bind(id)
            .bind(status_id)
            .bind(ApprovalStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Sent or received by `email`, newest first.
    pub async fn list_for_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Vec<CollaborationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM collaborations \
             WHERE sender_email = $1 OR receiver_email = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CollaborationRow>(&query)
            .bind(email)
            .fetch_all(pool)
            .await
    }

    /// Received by `email`, newest first.
    pub async fn list_incoming(
        pool: &PgPool,
        email: &str,
    ) -> Result<Vec<CollaborationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM collaborations \
             WHERE receiver_email = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CollaborationRow>(&query)
            .bind(email)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// MilestoneRepo
// ---------------------------------------------------------------------------

const MILESTONE_COLUMNS: &str =
    "id, collaboration_id, phase, report, submitted_by, author_id, author_email, created_at";

pub struct MilestoneRepo;

impl MilestoneRepo {
    pub async fn create(pool: &PgPool, input: &NewMilestone) -> Result<MilestoneRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO milestones \
                (collaboration_id, phase, report, submitted_by, author_id, author_email) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MILESTONE_COLUMNS}"
        );
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(input.collaboration_id)
            .bind(&input.phase)
            .bind(&input.report)
            .bind(input.submitted_by.name())
            .bind(input.author_id)
            .bind(&input.author_email)
            .fetch_one(pool)
            .await
    }

    /// Oldest first.
    pub async fn list_for_collaboration(
        pool: &PgPool,
        collaboration_id: DbId,
    ) -> Result<Vec<MilestoneRow>, sqlx::Error> {
        let query = format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones \
             WHERE collaboration_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(collaboration_id)
            .fetch_all(pool)
            .await
    }
}
