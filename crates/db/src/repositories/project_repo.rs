//! Repositories for the `projects` and `project_history` tables.

use portal_core::project::{NewProject, Project, ProjectSnapshot, Revision};
use portal_core::store::ProjectFilter;
use portal_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{ProjectHistoryRow, ProjectRow};

/// Column list for `projects` queries.
const COLUMNS: &str = "id, title, description, domain, department, project_type, year, \
                       owner_id, owner_email, owner_name, team_members, mentor, \
                       research_paper, github_link, file_url, is_funded, funding_agency, \
                       demanded_fund, granted_fund, amount_granted, status_id, approver_id, \
                       version, created_at, updated_at";

/// Column list for `project_history` queries.
const HISTORY_COLUMNS: &str =
    "id, project_id, version, title, description, file_url, recorded_at";

// ---------------------------------------------------------------------------
// ProjectRepo
// ---------------------------------------------------------------------------

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project at version 1.
    pub async fn create(pool: &PgPool, input: &NewProject) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                (title, description, domain, department, project_type, year, \
                 owner_id, owner_email, owner_name, team_members, mentor, \
                 research_paper, github_link, file_url, is_funded, funding_agency, \
                 demanded_fund, granted_fund, amount_granted, status_id, approver_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
                     $12, $13, $14, $15, $16, $17, $18, $19, $20, $21) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.domain)
            .bind(&input.department)
            .bind(input.project_type.name())
            .bind(&input.year)
            .bind(input.owner_id)
            .bind(&input.owner_email)
            .bind(&input.owner_name)
            .bind(Json(&input.team_members))
            .bind(&input.mentor)
            .bind(&input.research_paper)
            .bind(&input.github_link)
            .bind(&input.file_url)
            .bind(input.funding.is_funded)
            .bind(&input.funding.agency)
            .bind(&input.funding.demanded)
            .bind(&input.funding.granted)
            .bind(input.funding.amount_granted)
            .bind(input.status.id())
            .bind(input.approver_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write the mutable columns of `project` and append any history entries
    /// not yet stored, in one transaction.
    ///
    /// Returns `None` if the project no longer exists or its stored
    /// revision no longer matches `expected`.
    pub async fn save(
        pool: &PgPool,
        project: &Project,
        expected: &Revision,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE projects SET \
                title = $2, description = $3, domain = $4, github_link = $5, \
                file_url = $6, status_id = $7, approver_id = $8, version = $9, \
                updated_at = $10 \
             WHERE id = $1 AND version = $11 AND status_id = $12 AND updated_at = $13 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.domain)
            .bind(&project.github_link)
            .bind(&project.file_url)
            .bind(project.status.id())
            .bind(project.approver_id)
            .bind(project.version)
            .bind(project.updated_at)
            .bind(expected.version)
            .bind(expected.status.id())
            .bind(expected.updated_at)
            .fetch_optional(&mut *tx)
            .await?;

        if row.is_some() {
            for snapshot in &project.history {
                ProjectHistoryRepo::append_inner(&mut tx, project.id, snapshot).await?;
            }
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Delete a project. History rows go with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest first. Unset filter fields match everything.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE ($1::BIGINT IS NULL OR owner_id = $1) \
               AND ($2::BIGINT IS NULL OR approver_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(filter.owner_id)
            .bind(filter.approver_id)
            .bind(filter.limit)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// ProjectHistoryRepo
// ---------------------------------------------------------------------------

/// Append-only revision log. Rows are never updated.
pub struct ProjectHistoryRepo;

impl ProjectHistoryRepo {
    /// History of one project, oldest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectHistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM project_history \
             WHERE project_id = $1 ORDER BY version"
        );
        sqlx::query_as::<_, ProjectHistoryRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// History of several projects, grouped by project and oldest first.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<ProjectHistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM project_history \
             WHERE project_id = ANY($1) ORDER BY project_id, version"
        );
        sqlx::query_as::<_, ProjectHistoryRow>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert a snapshot unless its version is already recorded.
    async fn append_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        project_id: DbId,
        snapshot: &ProjectSnapshot,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_history \
                (project_id, version, title, description, file_url, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (project_id, version) DO NOTHING",
        )
        .bind(project_id)
        .bind(snapshot.version)
        .bind(&snapshot.title)
        .bind(&snapshot.description)
        .bind(&snapshot.file_url)
        .bind(snapshot.recorded_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
