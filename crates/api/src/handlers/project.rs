//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::project::{Project, ProjectDraft, ProjectPatch};
use portal_core::types::DbId;

use super::StatusUpdate;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(draft): Json<ProjectDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = state.projects.submit(&auth.actor, draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.projects.list_all().await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/mine
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.projects.list_owned(&auth.actor).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/approved-by-me
pub async fn list_approved_by_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.projects.list_approved_by(&auth.actor).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.projects.get(id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
///
/// Owner only. A real change bumps the version and sends the project back
/// to `Pending`.
pub async fn amend(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<ProjectPatch>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.projects.amend(&auth.actor, id, patch).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.projects.remove(&auth.actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/projects/{id}/status
pub async fn set_status(
    RequireReviewer(auth): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .projects
        .set_status(&auth.actor, id, update.status)
        .await?;
    Ok(Json(DataResponse { data: project }))
}
