//! Portal roles.
//!
//! Role names must match the `role` claim issued by the identity provider.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_FACULTY: &str = "faculty";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PRINCIPAL: &str = "principal";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_FACULTY, ROLE_ADMIN, ROLE_PRINCIPAL];

/// The role an actor holds for the duration of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
    Principal,
}

impl Role {
    /// Parse a role name (exact, lowercase).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            ROLE_STUDENT => Ok(Role::Student),
            ROLE_FACULTY => Ok(Role::Faculty),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_PRINCIPAL => Ok(Role::Principal),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Student => ROLE_STUDENT,
            Role::Faculty => ROLE_FACULTY,
            Role::Admin => ROLE_ADMIN,
            Role::Principal => ROLE_PRINCIPAL,
        }
    }

    /// Faculty, admin and principal may decide approvals.
    pub fn is_reviewer(self) -> bool {
        !matches!(self, Role::Student)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
