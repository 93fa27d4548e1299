//! Research project records, submission drafts, amendment patches, and the
//! versioning rules applied when an already-decided project is edited.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::actor::Actor;
use crate::error::CoreError;
use crate::status::ApprovalStatus;
use crate::types::{DbId, Timestamp};

/// Version assigned to every newly submitted project.
pub const INITIAL_VERSION: i32 = 1;

/// Where the project's problem statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    IndustryDefined,
    UserDefined,
}

impl ProjectType {
    pub fn name(self) -> &'static str {
        match self {
            ProjectType::IndustryDefined => "IndustryDefined",
            ProjectType::UserDefined => "UserDefined",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "IndustryDefined" => Ok(ProjectType::IndustryDefined),
            "UserDefined" => Ok(ProjectType::UserDefined),
            other => Err(CoreError::Validation(format!(
                "Invalid project type '{other}'. Must be one of: IndustryDefined, UserDefined"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TeamMember {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// Funding details. Amount fields are only retained while `is_funded` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Funding {
    pub is_funded: bool,
    pub agency: Option<String>,
    pub demanded: Option<String>,
    pub granted: Option<String>,
    /// Numeric form of `granted`, summed by the portal analytics.
    pub amount_granted: f64,
}

impl Funding {
    /// Build funding details, blanking everything when the project is unfunded.
    pub fn new(
        is_funded: bool,
        agency: Option<String>,
        demanded: Option<String>,
        granted: Option<String>,
    ) -> Result<Self, CoreError> {
        if !is_funded {
            return Ok(Self::default());
        }
        let granted = non_blank(granted);
        let amount_granted = match &granted {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|amount| amount.is_finite())
                .ok_or_else(|| {
                    CoreError::Validation(format!("Granted fund '{raw}' is not a number"))
                })?,
            None => 0.0,
        };
        if amount_granted < 0.0 {
            return Err(CoreError::Validation(
                "Granted fund must not be negative".to_string(),
            ));
        }
        Ok(Self {
            is_funded,
            agency: non_blank(agency),
            demanded: non_blank(demanded),
            granted,
            amount_granted,
        })
    }
}

/// An entry in a project's append-only revision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub title: String,
    pub description: String,
    pub file_url: Option<String>,
    pub version: i32,
    pub recorded_at: Timestamp,
}

/// The fields a writer observed when it loaded a project.
///
/// A save only lands if the stored row still carries the same revision, so
/// two writers that loaded the same copy cannot both commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    pub version: i32,
    pub status: ApprovalStatus,
    pub updated_at: Timestamp,
}

/// A tracked research project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub department: Option<String>,
    pub project_type: ProjectType,
    pub year: String,
    pub owner_id: DbId,
    pub owner_email: String,
    pub owner_name: String,
    pub team_members: Vec<TeamMember>,
    pub mentor: Option<String>,
    pub research_paper: Option<String>,
    pub github_link: Option<String>,
    /// Opaque reference to the uploaded synopsis document.
    pub file_url: Option<String>,
    pub funding: Funding,
    pub status: ApprovalStatus,
    pub approver_id: Option<DbId>,
    pub version: i32,
    pub history: Vec<ProjectSnapshot>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        self.owner_id == actor.id
    }

    pub fn revision(&self) -> Revision {
        Revision {
            version: self.version,
            status: self.status,
            updated_at: self.updated_at,
        }
    }

    /// The pre-edit state recorded before an amendment bumps the version.
    pub fn snapshot(&self, recorded_at: Timestamp) -> ProjectSnapshot {
        ProjectSnapshot {
            title: self.title.clone(),
            description: self.description.clone(),
            file_url: self.file_url.clone(),
            version: self.version,
            recorded_at,
        }
    }

    /// Apply an owner's amendment.
    ///
    /// If the project has already been decided, the current content is
    /// appended to `history`, `version` is incremented and the project goes
    /// back to `Pending` for re-review. Returns `true` when a revision was
    /// recorded.
    pub fn apply_amendment(&mut self, patch: &ProjectPatch, now: Timestamp) -> bool {
        let revised = self.status != ApprovalStatus::Pending;
        if revised {
            self.history.push(self.snapshot(now));
            self.version += 1;
            self.status = ApprovalStatus::Pending;
            self.approver_id = None;
        }

        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(domain) = &patch.domain {
            self.domain = domain.trim().to_string();
        }
        if let Some(link) = &patch.github_link {
            self.github_link = Some(link.trim().to_string());
        }
        if let Some(file_url) = &patch.file_url {
            self.file_url = Some(file_url.clone());
        }
        self.updated_at = now;
        revised
    }

    /// Record a reviewer decision. The approver is only set on approval.
    pub fn apply_decision(&mut self, status: ApprovalStatus, reviewer: &Actor, now: Timestamp) {
        self.status = status;
        if status == ApprovalStatus::Approved {
            self.approver_id = Some(reviewer.id);
        }
        self.updated_at = now;
    }

    /// Owner plus every team member email, without duplicates.
    pub fn notification_recipients(&self) -> Vec<String> {
        let mut recipients = vec![self.owner_email.clone()];
        for member in &self.team_members {
            if !member.email.is_empty() && !recipients.contains(&member.email) {
                recipients.push(member.email.clone());
            }
        }
        recipients
    }
}

/// Submission payload for a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectDraft {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 120))]
    pub domain: String,
    pub department: Option<String>,
    pub project_type: ProjectType,
    #[validate(length(min = 1, max = 20))]
    pub year: String,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    pub mentor: Option<String>,
    pub research_paper: Option<String>,
    pub github_link: Option<String>,
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_funded: bool,
    pub funding_agency: Option<String>,
    pub demanded_fund: Option<String>,
    pub granted_fund: Option<String>,
}

/// A validated project ready to be inserted by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub domain: String,
    pub department: Option<String>,
    pub project_type: ProjectType,
    pub year: String,
    pub owner_id: DbId,
    pub owner_email: String,
    pub owner_name: String,
    pub team_members: Vec<TeamMember>,
    pub mentor: Option<String>,
    pub research_paper: Option<String>,
    pub github_link: Option<String>,
    pub file_url: Option<String>,
    pub funding: Funding,
    pub status: ApprovalStatus,
    pub approver_id: Option<DbId>,
}

impl ProjectDraft {
    /// Validate the draft for the submitting actor and build the insert.
    ///
    /// Students must attach a synopsis; reviewers must cite a research paper
    /// and their submissions are approved on creation.
    pub fn into_new_project(self, actor: &Actor) -> Result<NewProject, CoreError> {
        self.validate()?;
        for member in &self.team_members {
            member.validate()?;
        }
        require_non_blank("title", &self.title)?;
        require_non_blank("description", &self.description)?;
        require_non_blank("domain", &self.domain)?;
        require_non_blank("year", &self.year)?;

        let file_url = non_blank(self.file_url);
        let research_paper = non_blank(self.research_paper);

        let (status, approver_id) = if actor.is_reviewer() {
            if research_paper.is_none() {
                return Err(CoreError::Validation(
                    "A research paper link (DOI) is required for faculty submissions"
                        .to_string(),
                ));
            }
            (ApprovalStatus::Approved, Some(actor.id))
        } else {
            if file_url.is_none() {
                return Err(CoreError::Validation(
                    "A synopsis document is required for student submissions".to_string(),
                ));
            }
            (ApprovalStatus::Pending, None)
        };

        let funding = Funding::new(
            self.is_funded,
            self.funding_agency,
            self.demanded_fund,
            self.granted_fund,
        )?;

        Ok(NewProject {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            domain: self.domain.trim().to_string(),
            department: non_blank(self.department),
            project_type: self.project_type,
            year: self.year.trim().to_string(),
            owner_id: actor.id,
            owner_email: actor.email.clone(),
            owner_name: actor.name.clone(),
            team_members: self.team_members,
            mentor: non_blank(self.mentor),
            research_paper,
            github_link: non_blank(self.github_link),
            file_url,
            funding,
            status,
            approver_id,
        })
    }
}

/// Owner edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub github_link: Option<String>,
    pub file_url: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.domain.is_none()
            && self.github_link.is_none()
            && self.file_url.is_none()
    }

    /// Reject empty patches and patches that blank a field.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::Validation("No fields to update".to_string()));
        }
        let fields = [
            ("title", &self.title),
            ("description", &self.description),
            ("domain", &self.domain),
            ("github_link", &self.github_link),
            ("file_url", &self.file_url),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                require_non_blank(name, value)?;
            }
        }
        Ok(())
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field} must not be blank")))
    } else {
        Ok(())
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
    use chrono::Utc;

    use super::*;
    use crate::roles::Role;

    fn student() -> Actor {
        Actor::new(10, Role::Student, "stu@uni.edu", "Stu Dent")
    }

    fn faculty() -> Actor {
        Actor::new(20, Role::Faculty, "prof@uni.edu", "Prof Essor")
    }

    fn draft() -> ProjectDraft {
        ProjectDraft {
            title: "Soil moisture mesh".into(),
            description: "LoRa sensor network".into(),
            domain: "IoT".into(),
            department: Some("IT".into()),
            project_type: ProjectType::UserDefined,
            year: "2025".into(),
            team_members: vec![TeamMember {
                name: "Ana".into(),
                email: "ana@uni.edu".into(),
            }],
            mentor: Some("Dr. M".into()),
            research_paper: None,
            github_link: None,
            file_url: Some("/uploads/synopsis-1.pdf".into()),
            is_funded: false,
            funding_agency: Some("ignored".into()),
            demanded_fund: None,
            granted_fund: Some("5000".into()),
        }
    }

    fn project_from(new: NewProject) -> Project {
        let now = Utc::now();
        Project {
            id: 1,
            title: new.title,
            description: new.description,
            domain: new.domain,
            department: new.department,
            project_type: new.project_type,
            year: new.year,
            owner_id: new.owner_id,
            owner_email: new.owner_email,
            owner_name: new.owner_name,
            team_members: new.team_members,
            mentor: new.mentor,
            research_paper: new.research_paper,
            github_link: new.github_link,
            file_url: new.file_url,
            funding: new.funding,
            status: new.status,
            approver_id: new.approver_id,
            version: INITIAL_VERSION,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn student_draft_is_pending_without_approver() {
        let new = draft().into_new_project(&student()).unwrap();
        assert_eq!(new.status, ApprovalStatus::Pending);
        assert_eq!(new.approver_id, None);
        assert_eq!(new.owner_email, "stu@uni.edu");
    }

    #[test]
    fn student_draft_requires_synopsis() {
        let mut d = draft();
        d.file_url = Some("  ".into());
        assert_matches!(
            d.into_new_project(&student()),
            Err(CoreError::Validation(msg)) if msg.contains("synopsis")
        );
    }

    #[test]
    fn faculty_draft_requires_research_paper() {
        assert_matches!(
            draft().into_new_project(&faculty()),
            Err(CoreError::Validation(msg)) if msg.contains("research paper")
        );
    }

    #[test]
    fn faculty_draft_auto_approves() {
        let mut d = draft();
        d.research_paper = Some("https://doi.org/10.1000/xyz".into());
        let new = d.into_new_project(&faculty()).unwrap();
        assert_eq!(new.status, ApprovalStatus::Approved);
        assert_eq!(new.approver_id, Some(20));
    }

    #[test]
    fn blank_title_rejected() {
        let mut d = draft();
        d.title = "   ".into();
        assert_matches!(d.into_new_project(&student()), Err(CoreError::Validation(_)));
    }

    #[test]
    fn malformed_team_email_rejected() {
        let mut d = draft();
        d.team_members[0].email = "not-an-email".into();
        assert_matches!(d.into_new_project(&student()), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unfunded_project_drops_funding_fields() {
        let new = draft().into_new_project(&student()).unwrap();
        assert_eq!(new.funding, Funding::default());
    }

    #[test]
    fn funded_project_parses_granted_amount() {
        let funding = Funding::new(true, Some("DST".into()), Some("9000".into()), Some("7500.5".into()))
            .unwrap();
        assert_eq!(funding.amount_granted, 7500.5);
        assert_eq!(funding.agency.as_deref(), Some("DST"));
    }

    #[test]
    fn funded_project_rejects_non_numeric_grant() {
        assert_matches!(
            Funding::new(true, None, None, Some("lots".into())),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn funded_project_rejects_non_finite_grant() {
        for raw in ["NaN", "inf", "-infinity", "1e400"] {
            assert_matches!(
                Funding::new(true, None, None, Some(raw.into())),
                Err(CoreError::Validation(msg)) if msg.contains("not a number"),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn revision_tracks_decisions() {
        let mut project = project_from(draft().into_new_project(&student()).unwrap());
        let loaded = project.revision();
        project.apply_decision(ApprovalStatus::Approved, &faculty(), Utc::now());
        assert_ne!(project.revision(), loaded);
        assert_eq!(project.revision().version, loaded.version);
    }

    #[test]
    fn amending_pending_project_keeps_version() {
        let mut project = project_from(draft().into_new_project(&student()).unwrap());
        let patch = ProjectPatch {
            title: Some("New title".into()),
            ..Default::default()
        };
        assert!(!project.apply_amendment(&patch, Utc::now()));
        assert_eq!(project.version, 1);
        assert!(project.history.is_empty());
        assert_eq!(project.title, "New title");
    }

    #[test]
    fn amending_approved_project_records_revision() {
        let mut project = project_from(draft().into_new_project(&student()).unwrap());
        project.apply_decision(ApprovalStatus::Approved, &faculty(), Utc::now());
        assert_eq!(project.approver_id, Some(20));

        let patch = ProjectPatch {
            description: Some("Rewritten".into()),
            ..Default::default()
        };
        assert!(project.apply_amendment(&patch, Utc::now()));
        assert_eq!(project.version, 2);
        assert_eq!(project.status, ApprovalStatus::Pending);
        assert_eq!(project.approver_id, None);
        assert_eq!(project.history.len(), 1);
        assert_eq!(project.history[0].description, "LoRa sensor network");
        assert_eq!(project.history[0].version, 1);
        assert_eq!(project.title, "Soil moisture mesh");
    }

    #[test]
    fn rejection_does_not_set_approver() {
        let mut project = project_from(draft().into_new_project(&student()).unwrap());
        project.apply_decision(ApprovalStatus::Rejected, &faculty(), Utc::now());
        assert_eq!(project.approver_id, None);
    }

    #[test]
    fn empty_patch_rejected() {
        assert_matches!(ProjectPatch::default().check(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blanking_patch_rejected() {
        let patch = ProjectPatch {
            domain: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(patch.check(), Err(CoreError::Validation(msg)) if msg.contains("domain"));
    }

    #[test]
    fn recipients_deduplicate_owner() {
        let mut d = draft();
        d.team_members.push(TeamMember {
            name: "Me again".into(),
            email: "stu@uni.edu".into(),
        });
        let project = project_from(d.into_new_project(&student()).unwrap());
        assert_eq!(
            project.notification_recipients(),
            vec!["stu@uni.edu".to_string(), "ana@uni.edu".to_string()]
        );
    }
}
