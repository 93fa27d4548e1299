//! `projects` and `project_history` rows.

use portal_core::error::StoreError;
use portal_core::project::{Funding, Project, ProjectSnapshot, ProjectType, TeamMember};
use portal_core::status::{ApprovalStatus, StatusId};
use portal_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

use super::corrupt_row;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub department: Option<String>,
    pub project_type: String,
    pub year: String,
    pub owner_id: DbId,
    pub owner_email: String,
    pub owner_name: String,
    pub team_members: Json<Vec<TeamMember>>,
    pub mentor: Option<String>,
    pub research_paper: Option<String>,
    pub github_link: Option<String>,
    pub file_url: Option<String>,
    pub is_funded: bool,
    pub funding_agency: Option<String>,
    pub demanded_fund: Option<String>,
    pub granted_fund: Option<String>,
    pub amount_granted: f64,
    pub status_id: StatusId,
    pub approver_id: Option<DbId>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `project_history` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectHistoryRow {
    pub id: DbId,
    pub project_id: DbId,
    pub version: i32,
    pub title: String,
    pub description: String,
    pub file_url: Option<String>,
    pub recorded_at: Timestamp,
}

impl From<ProjectHistoryRow> for ProjectSnapshot {
    fn from(row: ProjectHistoryRow) -> Self {
        ProjectSnapshot {
            title: row.title,
            description: row.description,
            file_url: row.file_url,
            version: row.version,
            recorded_at: row.recorded_at,
        }
    }
}

impl ProjectRow {
    /// Combine the row with its history (oldest first) into a domain project.
    pub fn into_project(self, history: Vec<ProjectHistoryRow>) -> Result<Project, StoreError> {
        let project_type =
            ProjectType::from_name(&self.project_type).map_err(|e| corrupt_row("projects", e))?;
        let status =
            ApprovalStatus::from_id(self.status_id).map_err(|e| corrupt_row("projects", e))?;

        Ok(Project {
            id: self.id,
            title: self.title,
            description: self.description,
            domain: self.domain,
            department: self.department,
            project_type,
            year: self.year,
            owner_id: self.owner_id,
            owner_email: self.owner_email,
            owner_name: self.owner_name,
            team_members: self.team_members.0,
            mentor: self.mentor,
            research_paper: self.research_paper,
            github_link: self.github_link,
            file_url: self.file_url,
            funding: Funding {
                is_funded: self.is_funded,
                agency: self.funding_agency,
                demanded: self.demanded_fund,
                granted: self.granted_fund,
                amount_granted: self.amount_granted,
            },
            status,
            approver_id: self.approver_id,
            version: self.version,
            history: history.into_iter().map(ProjectSnapshot::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
