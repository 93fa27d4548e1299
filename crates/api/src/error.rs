use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portal_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for workflow rejections and adds HTTP-specific
/// variants. Every variant renders as `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed request the workflow never saw.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => {
                let status = match core {
                    CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                    CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                    CoreError::InvalidState(_) | CoreError::Conflict(_) => StatusCode::CONFLICT,
                    CoreError::NoOp(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, core.code(), core_message(core))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Client-facing message for a workflow error. Internal details are logged,
/// not returned.
fn core_message(err: &CoreError) -> String {
    match err {
        CoreError::NotFound { entity, id } => format!("{entity} with id {id} not found"),
        CoreError::Validation(msg)
        | CoreError::Forbidden(msg)
        | CoreError::InvalidState(msg)
        | CoreError::Conflict(msg)
        | CoreError::NoOp(msg)
        | CoreError::Unauthorized(msg) => msg.clone(),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            "An internal error occurred".to_string()
        }
    }
}
