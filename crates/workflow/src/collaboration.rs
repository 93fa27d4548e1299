//! Collaboration matching by email, one-shot resolution, directives and the
//! milestone log.

use std::sync::Arc;

use portal_core::actor::Actor;
use portal_core::collaboration::{
    Collaboration, CollaborationProposal, Milestone, MilestoneEntry,
};
use portal_core::error::CoreError;
use portal_core::notify::Notifier;
use portal_core::status::{state_machine, ApprovalStatus};
use portal_core::store::PortalStore;
use portal_core::types::DbId;
use serde::Serialize;

use crate::{dispatch, messages};

/// Result of [`CollaborationMatcher::issue_directive`]. Directives are not
/// stored; only the delivery outcome is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveReceipt {
    pub collaboration_id: DbId,
    pub to: String,
    pub delivered: bool,
}

#[derive(Clone)]
pub struct CollaborationMatcher {
    store: Arc<dyn PortalStore>,
    notifier: Arc<dyn Notifier>,
}

impl CollaborationMatcher {
    pub fn new(store: Arc<dyn PortalStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// File a proposal addressed to `receiver_email`. The receiver gets the
    /// request, the sender a receipt.
    pub async fn propose(
        &self,
        sender: &Actor,
        proposal: CollaborationProposal,
    ) -> Result<Collaboration, CoreError> {
        let input = proposal.into_new_collaboration(sender)?;
        let collab = self.store.insert_collaboration(&input).await?;
        tracing::info!(
            collaboration_id = collab.id,
            sender_id = sender.id,
            receiver = %collab.receiver_email,
            "Collaboration proposed"
        );

        let notes = vec![
            messages::collaboration_request(&collab),
            messages::collaboration_receipt(&collab),
        ];
        dispatch::deliver_all(self.notifier.as_ref(), notes).await;
        Ok(collab)
    }

    /// Proposals where `actor` is sender or receiver.
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<Collaboration>, CoreError> {
        Ok(self.store.list_collaborations_for(&actor.email).await?)
    }

    /// Proposals addressed to `actor`.
    pub async fn list_incoming(&self, actor: &Actor) -> Result<Vec<Collaboration>, CoreError> {
        Ok(self.store.list_incoming_collaborations(&actor.email).await?)
    }

    /// Receiver accepts or declines. A collaboration is resolved at most once.
    pub async fn resolve(
        &self,
        actor: &Actor,
        id: DbId,
        status: ApprovalStatus,
    ) -> Result<Collaboration, CoreError> {
        let collab = self.load(id).await?;
        if collab.status.is_terminal() {
            return Err(already_resolved(&collab));
        }
        if !collab.is_receiver(actor) {
            return Err(CoreError::Forbidden(
                "Only the receiver may resolve a collaboration".to_string(),
            ));
        }
        state_machine::validate_decision_target(status)?;

        // Lost a race with a concurrent resolution.
        let resolved = self
            .store
            .resolve_collaboration(id, status)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidState("Collaboration was resolved concurrently".to_string())
            })?;
        tracing::info!(
            collaboration_id = id,
            receiver_id = actor.id,
            status = %resolved.status,
            "Collaboration resolved"
        );

        dispatch::deliver(
            self.notifier.as_ref(),
            messages::collaboration_decision(&resolved),
        )
        .await;
        Ok(resolved)
    }

    /// Receiver of an approved collaboration sends an instruction to the
    /// sender. Delivery is best-effort and reported in the receipt.
    pub async fn issue_directive(
        &self,
        actor: &Actor,
        id: DbId,
        text: &str,
    ) -> Result<DirectiveReceipt, CoreError> {
        let collab = self.load(id).await?;
        if collab.status != ApprovalStatus::Approved {
            return Err(CoreError::InvalidState(format!(
                "Directives need an approved collaboration; this one is {}",
                collab.status
            )));
        }
        if !collab.is_receiver(actor) {
            return Err(CoreError::Forbidden(
                "Only the receiver may issue directives".to_string(),
            ));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation(
                "Directive text must not be blank".to_string(),
            ));
        }

        let delivered = dispatch::deliver(
            self.notifier.as_ref(),
            messages::directive(&collab, actor, text),
        )
        .await;
        tracing::info!(collaboration_id = id, delivered, "Directive issued");
        Ok(DirectiveReceipt {
            collaboration_id: id,
            to: collab.sender_email().to_string(),
            delivered,
        })
    }

    /// Either party logs progress on an approved collaboration.
    pub async fn add_milestone(
        &self,
        actor: &Actor,
        id: DbId,
        entry: MilestoneEntry,
    ) -> Result<Milestone, CoreError> {
        let collab = self.load(id).await?;
        if !collab.is_party(actor) {
            return Err(not_a_party());
        }
        if collab.status != ApprovalStatus::Approved {
            return Err(CoreError::InvalidState(format!(
                "Milestones need an approved collaboration; this one is {}",
                collab.status
            )));
        }
        let input = entry.into_new_milestone(id, actor)?;
        let milestone = self.store.insert_milestone(&input).await?;
        tracing::info!(
            collaboration_id = id,
            milestone_id = milestone.id,
            submitted_by = milestone.submitted_by.name(),
            "Milestone logged"
        );
        Ok(milestone)
    }

    /// Milestones of a collaboration, oldest first. Parties only.
    pub async fn list_milestones(
        &self,
        actor: &Actor,
        id: DbId,
    ) -> Result<Vec<Milestone>, CoreError> {
        let collab = self.load(id).await?;
        if !collab.is_party(actor) {
            return Err(not_a_party());
        }
        Ok(self.store.list_milestones(id).await?)
    }

    async fn load(&self, id: DbId) -> Result<Collaboration, CoreError> {
        self.store
            .find_collaboration(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Collaboration",
                id,
            })
    }
}

fn already_resolved(collab: &Collaboration) -> CoreError {
    CoreError::InvalidState(format!("Collaboration is already {}", collab.status))
}

fn not_a_party() -> CoreError {
    CoreError::Forbidden("Not a party to this collaboration".to_string())
}
