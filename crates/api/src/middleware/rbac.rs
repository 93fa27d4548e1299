//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. The workflow repeats these checks; the
//! extractors let a route declare its audience in its signature.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use portal_core::error::CoreError;
use portal_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a reviewing role (faculty, admin or principal). Rejects with
/// 403 Forbidden otherwise.
///
/// ```ignore
/// async fn decide(RequireReviewer(auth): RequireReviewer) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireReviewer(pub AuthUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.actor.is_reviewer() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Faculty, Admin or Principal role required".into(),
            )));
        }
        Ok(RequireReviewer(auth))
    }
}

/// Requires the `principal` role.
pub struct RequirePrincipal(pub AuthUser);

impl FromRequestParts<AppState> for RequirePrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if auth.actor.role != Role::Principal {
            return Err(AppError::Core(CoreError::Forbidden(
                "Principal role required".into(),
            )));
        }
        Ok(RequirePrincipal(auth))
    }
}
