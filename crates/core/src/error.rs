use crate::types::DbId;

/// Domain error taxonomy shared by every workflow operation.
///
/// Each variant is one rejection kind the boundary layer can map to a
/// response code (see [`CoreError::code`]).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The actor lacks the role or ownership required for the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation is not legal in the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A batch operation matched zero eligible entities.
    #[error("Nothing to do: {0}")]
    NoOp(String),

    /// Missing or unusable credentials. Only raised at the HTTP boundary.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::InvalidState(_) => "INVALID_STATE",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::NoOp(_) => "NO_OP",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}

/// Errors reported by an entity store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A uniqueness guard at the store boundary rejected the write.
    #[error("Store conflict: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Convenience alias for store adapter results.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn codes_are_distinct_per_kind() {
        let errors = [
            CoreError::NotFound { entity: "Project", id: 1 },
            CoreError::Validation(String::new()),
            CoreError::Forbidden(String::new()),
            CoreError::InvalidState(String::new()),
            CoreError::Conflict(String::new()),
            CoreError::NoOp(String::new()),
            CoreError::Unauthorized(String::new()),
            CoreError::Internal(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(CoreError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn store_conflict_becomes_core_conflict() {
        let err: CoreError = StoreError::Conflict("slot taken".into()).into();
        assert_matches!(err, CoreError::Conflict(msg) if msg == "slot taken");
    }

    #[test]
    fn store_backend_becomes_internal() {
        let err: CoreError = StoreError::Backend("pool closed".into()).into();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[test]
    fn not_found_display() {
        let err = CoreError::NotFound { entity: "LabBooking", id: 7 };
        assert_eq!(err.to_string(), "Entity not found: LabBooking with id 7");
    }
}
