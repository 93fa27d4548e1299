//! Project lifecycle: submission, amendment, review, removal.

use std::sync::Arc;

use chrono::Utc;
use portal_core::actor::Actor;
use portal_core::error::CoreError;
use portal_core::notify::Notifier;
use portal_core::project::{Project, ProjectDraft, ProjectPatch, Revision};
use portal_core::status::{state_machine, ApprovalStatus};
use portal_core::store::{PortalStore, ProjectFilter};
use portal_core::types::DbId;

use crate::{dispatch, messages};

#[derive(Clone)]
pub struct ProjectLifecycle {
    store: Arc<dyn PortalStore>,
    notifier: Arc<dyn Notifier>,
}

impl ProjectLifecycle {
    pub fn new(store: Arc<dyn PortalStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create a project owned by `actor`.
    ///
    /// Students submit for review and must attach a synopsis file. Reviewers
    /// publish directly: their projects start `Approved` with the submitter
    /// as approver and must cite a research paper.
    pub async fn submit(&self, actor: &Actor, draft: ProjectDraft) -> Result<Project, CoreError> {
        let input = draft.into_new_project(actor)?;
        let project = self.store.insert_project(&input).await?;
        tracing::info!(
            project_id = project.id,
            owner_id = actor.id,
            status = %project.status,
            "Project submitted"
        );
        Ok(project)
    }

    /// Owner edit. A decided project is snapshotted into its history, its
    /// version bumped and sent back to `Pending`.
    pub async fn amend(
        &self,
        actor: &Actor,
        id: DbId,
        patch: ProjectPatch,
    ) -> Result<Project, CoreError> {
        let mut project = self.load(id).await?;
        if !project.is_owned_by(actor) {
            return Err(CoreError::Forbidden(
                "Only the project owner may edit it".to_string(),
            ));
        }
        patch.check()?;

        let seen = project.revision();
        let revised = project.apply_amendment(&patch, Utc::now());
        let saved = self.save(&project, &seen).await?;
        tracing::info!(
            project_id = saved.id,
            version = saved.version,
            revised,
            "Project amended"
        );
        Ok(saved)
    }

    /// Reviewer decision. Owner and team members are notified.
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: DbId,
        status: ApprovalStatus,
    ) -> Result<Project, CoreError> {
        actor.require_reviewer("review projects")?;
        let mut project = self.load(id).await?;
        state_machine::validate_decision("Project", project.status, status)?;

        let seen = project.revision();
        project.apply_decision(status, actor, Utc::now());
        let saved = self.save(&project, &seen).await?;
        tracing::info!(
            project_id = saved.id,
            reviewer_id = actor.id,
            status = %saved.status,
            "Project reviewed"
        );

        let notes = saved
            .notification_recipients()
            .iter()
            .map(|to| messages::project_decision(&saved, to))
            .collect();
        dispatch::deliver_all(self.notifier.as_ref(), notes).await;
        Ok(saved)
    }

    /// Permanent removal by the owner or any reviewer.
    pub async fn remove(&self, actor: &Actor, id: DbId) -> Result<(), CoreError> {
        let project = self.load(id).await?;
        if !project.is_owned_by(actor) && !actor.is_reviewer() {
            return Err(CoreError::Forbidden(
                "Only the owner or a reviewer may delete a project".to_string(),
            ));
        }
        if !self.store.delete_project(id).await? {
            return Err(CoreError::NotFound { entity: "Project", id });
        }
        tracing::info!(project_id = id, actor_id = actor.id, "Project deleted");
        Ok(())
    }

    pub async fn get(&self, id: DbId) -> Result<Project, CoreError> {
        self.load(id).await
    }

    /// Every project, newest first.
    pub async fn list_all(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.store.list_projects(&ProjectFilter::default()).await?)
    }

    pub async fn list_owned(&self, actor: &Actor) -> Result<Vec<Project>, CoreError> {
        let filter = ProjectFilter {
            owner_id: Some(actor.id),
            ..Default::default()
        };
        Ok(self.store.list_projects(&filter).await?)
    }

    /// Projects `actor` approved as reviewer.
    pub async fn list_approved_by(&self, actor: &Actor) -> Result<Vec<Project>, CoreError> {
        let filter = ProjectFilter {
            approver_id: Some(actor.id),
            ..Default::default()
        };
        Ok(self.store.list_projects(&filter).await?)
    }

    /// Write `project` unless someone else saved it since `seen` was read.
    async fn save(&self, project: &Project, seen: &Revision) -> Result<Project, CoreError> {
        self.store
            .save_project(project, seen)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidState(
                    "Project was modified concurrently; reload and try again".to_string(),
                )
            })
    }

    async fn load(&self, id: DbId) -> Result<Project, CoreError> {
        self.store
            .find_project(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Project", id })
    }
}
