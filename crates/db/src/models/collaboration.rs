//! `collaborations` and `milestones` rows.
//!
//! The sender profile and target project are stored flattened; the row
//! conversions regroup them.

use portal_core::collaboration::{
    Collaboration, Milestone, MilestoneAuthor, SenderProfile, TargetProject,
};
use portal_core::error::StoreError;
use portal_core::status::{ApprovalStatus, StatusId};
use portal_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::corrupt_row;

/// A row from the `collaborations` table.
#[derive(Debug, Clone, FromRow)]
pub struct CollaborationRow {
    pub id: DbId,
    pub sender_id: DbId,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_role: String,
    pub sender_department: Option<String>,
    pub sender_enrollment: Option<String>,
    pub sender_designation: Option<String>,
    pub sender_achievements: Option<String>,
    pub sender_linkedin: Option<String>,
    pub receiver_email: String,
    pub project_title: String,
    pub project_domain: Option<String>,
    pub project_github_link: Option<String>,
    pub project_paper_link: Option<String>,
    pub project_description: Option<String>,
    pub message: Option<String>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
}

impl TryFrom<CollaborationRow> for Collaboration {
    type Error = StoreError;

    fn try_from(row: CollaborationRow) -> Result<Self, Self::Error> {
        Ok(Collaboration {
            id: row.id,
            sender_id: row.sender_id,
            sender: SenderProfile {
                name: row.sender_name,
                email: row.sender_email,
                role: row.sender_role,
                department: row.sender_department,
                enrollment: row.sender_enrollment,
                designation: row.sender_designation,
                achievements: row.sender_achievements,
                linkedin: row.sender_linkedin,
            },
            receiver_email: row.receiver_email,
            project: TargetProject {
                title: row.project_title,
                domain: row.project_domain,
                github_link: row.project_github_link,
                research_paper_link: row.project_paper_link,
                description: row.project_description,
            },
            message: row.message,
            status: ApprovalStatus::from_id(row.status_id)
                .map_err(|e| corrupt_row("collaborations", e))?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `milestones` table.
#[derive(Debug, Clone, FromRow)]
pub struct MilestoneRow {
    pub id: DbId,
    pub collaboration_id: DbId,
    pub phase: String,
    pub report: String,
    pub submitted_by: String,
    pub author_id: DbId,
    pub author_email: String,
    pub created_at: Timestamp,
}

impl TryFrom<MilestoneRow> for Milestone {
    type Error = StoreError;

    fn try_from(row: MilestoneRow) -> Result<Self, Self::Error> {
        Ok(Milestone {
            id: row.id,
            collaboration_id: row.collaboration_id,
            phase: row.phase,
            report: row.report,
            submitted_by: MilestoneAuthor::from_name(&row.submitted_by)
                .map_err(|e| corrupt_row("milestones", e))?,
            author_id: row.author_id,
            author_email: row.author_email,
            created_at: row.created_at,
        })
    }
}
