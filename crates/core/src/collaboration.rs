//! Collaboration proposals between a sending actor and a receiver identified
//! only by email, and the milestone log kept against approved ones.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::actor::Actor;
use crate::error::CoreError;
use crate::roles::Role;
use crate::status::ApprovalStatus;
use crate::types::{DbId, Timestamp};

/// Sender profile copied into the proposal at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub enrollment: Option<String>,
    pub designation: Option<String>,
    pub achievements: Option<String>,
    pub linkedin: Option<String>,
}

/// The project the proposal is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProject {
    pub title: String,
    pub domain: Option<String>,
    pub github_link: Option<String>,
    pub research_paper_link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub id: DbId,
    pub sender_id: DbId,
    pub sender: SenderProfile,
    pub receiver_email: String,
    pub project: TargetProject,
    pub message: Option<String>,
    pub status: ApprovalStatus,
    pub created_at: Timestamp,
}

impl Collaboration {
    pub fn sender_email(&self) -> &str {
        &self.sender.email
    }

    /// Visible to `actor` iff their email is the sender's or the receiver's.
    pub fn is_party(&self, actor: &Actor) -> bool {
        actor.has_email(&self.sender.email) || actor.has_email(&self.receiver_email)
    }

    pub fn is_receiver(&self, actor: &Actor) -> bool {
        actor.has_email(&self.receiver_email)
    }
}

/// Proposal payload. Name, email and role come from the actor, the rest of
/// the profile from the payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CollaborationProposal {
    #[validate(email)]
    pub receiver_email: String,
    pub department: Option<String>,
    pub enrollment: Option<String>,
    pub designation: Option<String>,
    pub achievements: Option<String>,
    pub linkedin: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub project_title: String,
    pub domain: Option<String>,
    pub github_link: Option<String>,
    pub research_paper_link: Option<String>,
    pub project_description: Option<String>,
    #[validate(length(max = 5000))]
    pub message: Option<String>,
}

/// A validated proposal ready to be inserted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollaboration {
    pub sender_id: DbId,
    pub sender: SenderProfile,
    pub receiver_email: String,
    pub project: TargetProject,
    pub message: Option<String>,
}

impl CollaborationProposal {
    pub fn into_new_collaboration(self, sender: &Actor) -> Result<NewCollaboration, CoreError> {
        self.validate()?;
        let receiver_email = self.receiver_email.trim().to_string();
        if sender.has_email(&receiver_email) {
            return Err(CoreError::Validation(
                "Cannot propose a collaboration to yourself".to_string(),
            ));
        }
        if self.project_title.trim().is_empty() {
            return Err(CoreError::Validation(
                "project_title must not be blank".to_string(),
            ));
        }

        Ok(NewCollaboration {
            sender_id: sender.id,
            sender: SenderProfile {
                name: sender.name.clone(),
                email: sender.email.clone(),
                role: sender.role.name().to_string(),
                department: non_blank(self.department),
                enrollment: non_blank(self.enrollment),
                designation: non_blank(self.designation),
                achievements: non_blank(self.achievements),
                linkedin: non_blank(self.linkedin),
            },
            receiver_email,
            project: TargetProject {
                title: self.project_title.trim().to_string(),
                domain: non_blank(self.domain),
                github_link: non_blank(self.github_link),
                research_paper_link: non_blank(self.research_paper_link),
                description: non_blank(self.project_description),
            },
            message: non_blank(self.message),
        })
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// Which side of the collaboration logged a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneAuthor {
    Student,
    Faculty,
}

impl MilestoneAuthor {
    /// Students log as `Student`; every other role logs as `Faculty`.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Student => MilestoneAuthor::Student,
            Role::Faculty | Role::Admin | Role::Principal => MilestoneAuthor::Faculty,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MilestoneAuthor::Student => "Student",
            MilestoneAuthor::Faculty => "Faculty",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "Student" => Ok(MilestoneAuthor::Student),
            "Faculty" => Ok(MilestoneAuthor::Faculty),
            other => Err(CoreError::Internal(format!("Unknown milestone author '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: DbId,
    pub collaboration_id: DbId,
    pub phase: String,
    pub report: String,
    pub submitted_by: MilestoneAuthor,
    pub author_id: DbId,
    pub author_email: String,
    pub created_at: Timestamp,
}

/// Milestone payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MilestoneEntry {
    #[validate(length(min = 1, max = 200))]
    pub phase: String,
    #[validate(length(min = 1, max = 10000))]
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestone {
    pub collaboration_id: DbId,
    pub phase: String,
    pub report: String,
    pub submitted_by: MilestoneAuthor,
    pub author_id: DbId,
    pub author_email: String,
}

impl MilestoneEntry {
    pub fn into_new_milestone(
        self,
        collaboration_id: DbId,
        actor: &Actor,
    ) -> Result<NewMilestone, CoreError> {
        self.validate()?;
        let phase = self.phase.trim().to_string();
        let report = self.report.trim().to_string();
        if phase.is_empty() || report.is_empty() {
            return Err(CoreError::Validation(
                "phase and report must not be blank".to_string(),
            ));
        }
        Ok(NewMilestone {
            collaboration_id,
            phase,
            report,
            submitted_by: MilestoneAuthor::for_role(actor.role),
            author_id: actor.id,
            author_email: actor.email.clone(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn student() -> Actor {
        Actor::new(1, Role::Student, "stu@uni.edu", "Stu")
    }

    fn proposal() -> CollaborationProposal {
        CollaborationProposal {
            receiver_email: "prof@uni.edu".into(),
            department: Some("CS".into()),
            enrollment: Some("210280107001".into()),
            designation: None,
            achievements: Some("  ".into()),
            linkedin: None,
            project_title: "Federated learning on edge".into(),
            domain: Some("AI".into()),
            github_link: None,
            research_paper_link: None,
            project_description: None,
            message: Some("Keen to help".into()),
        }
    }

    #[test]
    fn snapshot_takes_identity_from_actor() {
        let new = proposal().into_new_collaboration(&student()).unwrap();
        assert_eq!(new.sender.name, "Stu");
        assert_eq!(new.sender.email, "stu@uni.edu");
        assert_eq!(new.sender.role, "student");
        assert_eq!(new.sender.department.as_deref(), Some("CS"));
        assert_eq!(new.sender.achievements, None);
    }

    #[test]
    fn proposing_to_self_rejected() {
        let mut p = proposal();
        p.receiver_email = "stu@uni.edu".into();
        assert_matches!(
            p.into_new_collaboration(&student()),
            Err(CoreError::Validation(msg)) if msg.contains("yourself")
        );
    }

    #[test]
    fn malformed_receiver_rejected() {
        let mut p = proposal();
        p.receiver_email = "prof".into();
        assert_matches!(p.into_new_collaboration(&student()), Err(CoreError::Validation(_)));
    }

    #[test]
    fn author_derived_from_role() {
        assert_eq!(MilestoneAuthor::for_role(Role::Student), MilestoneAuthor::Student);
        assert_eq!(MilestoneAuthor::for_role(Role::Faculty), MilestoneAuthor::Faculty);
        assert_eq!(MilestoneAuthor::for_role(Role::Principal), MilestoneAuthor::Faculty);
    }

    #[test]
    fn blank_milestone_rejected() {
        let entry = MilestoneEntry {
            phase: " ".into(),
            report: "done".into(),
        };
        assert_matches!(entry.into_new_milestone(4, &student()), Err(CoreError::Validation(_)));
    }

    #[test]
    fn milestone_records_author() {
        let entry = MilestoneEntry {
            phase: "Literature review".into(),
            report: "Read 12 papers".into(),
        };
        let new = entry.into_new_milestone(4, &student()).unwrap();
        assert_eq!(new.submitted_by, MilestoneAuthor::Student);
        assert_eq!(new.author_email, "stu@uni.edu");
        assert_eq!(new.collaboration_id, 4);
    }
}
