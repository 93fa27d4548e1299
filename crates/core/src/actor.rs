//! The authenticated identity passed explicitly into every workflow call.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// An authenticated actor. The core trusts this value as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: DbId,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: DbId, role: Role, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            email: email.into(),
            name: name.into(),
        }
    }

    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }

    /// Fail with `Forbidden` unless the actor may decide approvals.
    pub fn require_reviewer(&self, action: &str) -> Result<(), CoreError> {
        if self.is_reviewer() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Role '{}' may not {action}",
                self.role
            )))
        }
    }

    /// Email equality as used for collaboration visibility (exact match).
    pub fn has_email(&self, email: &str) -> bool {
        self.email == email
    }
}
