//! Approval status and the state machine shared by projects, lab bookings
//! and collaborations.
//!
//! Discriminants match the `approval_statuses` seed data (1-based SMALLSERIAL).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Approval lifecycle status.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending = 1,
    Approved = 2,
    Rejected = 3,
}

impl ApprovalStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Approved),
            3 => Ok(Self::Rejected),
            other => Err(CoreError::Internal(format!("Unknown approval status id {other}"))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl From<ApprovalStatus> for StatusId {
    fn from(value: ApprovalStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub mod state_machine {
    use super::ApprovalStatus;
    use crate::error::CoreError;

    /// Statuses reachable from `from` through a decision.
    ///
    /// `Approved` and `Rejected` are terminal and return an empty slice.
    pub fn valid_transitions(from: ApprovalStatus) -> &'static [ApprovalStatus] {
        match from {
            ApprovalStatus::Pending => &[ApprovalStatus::Approved, ApprovalStatus::Rejected],
            ApprovalStatus::Approved | ApprovalStatus::Rejected => &[],
        }
    }

    pub fn can_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Check that `to` is a decision at all (`Approved` or `Rejected`).
    pub fn validate_decision_target(to: ApprovalStatus) -> Result<(), CoreError> {
        if to.is_terminal() {
            Ok(())
        } else {
            Err(CoreError::Validation(
                "Status can only be set to Approved or Rejected".to_string(),
            ))
        }
    }

    /// Validate a decision on an entity whose current status is `from`.
    ///
    /// A non-decision target is a validation error; deciding an entity that
    /// is already terminal is an invalid-state error.
    pub fn validate_decision(
        entity: &str,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> Result<(), CoreError> {
        validate_decision_target(to)?;
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::InvalidState(format!(
                "{entity} is already {from}; cannot move to {to}"
            )))
        }
    }
}
