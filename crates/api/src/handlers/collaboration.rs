//! Handlers for the `/collaborations` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::collaboration::{Collaboration, CollaborationProposal, Milestone, MilestoneEntry};
use portal_core::types::DbId;
use portal_workflow::DirectiveReceipt;
use serde::Deserialize;

use super::StatusUpdate;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DirectiveRequest {
    pub text: String,
}

/// POST /api/v1/collaborations
pub async fn propose(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(proposal): Json<CollaborationProposal>,
) -> AppResult<(StatusCode, Json<DataResponse<Collaboration>>)> {
    let collab = state.collaborations.propose(&auth.actor, proposal).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: collab })))
}

/// GET /api/v1/collaborations -- sent or received by the caller.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Collaboration>>>> {
    let collabs = state.collaborations.list_for(&auth.actor).await?;
    Ok(Json(DataResponse { data: collabs }))
}

/// GET /api/v1/collaborations/incoming
pub async fn list_incoming(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Collaboration>>>> {
    let collabs = state.collaborations.list_incoming(&auth.actor).await?;
    Ok(Json(DataResponse { data: collabs }))
}

/// PUT /api/v1/collaborations/{id}/status
pub async fn resolve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Json<DataResponse<Collaboration>>> {
    let collab = state
        .collaborations
        .resolve(&auth.actor, id, update.status)
        .await?;
    Ok(Json(DataResponse { data: collab }))
}

/// POST /api/v1/collaborations/{id}/directives
pub async fn issue_directive(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(request): Json<DirectiveRequest>,
) -> AppResult<Json<DataResponse<DirectiveReceipt>>> {
    let receipt = state
        .collaborations
        .issue_directive(&auth.actor, id, &request.text)
        .await?;
    Ok(Json(DataResponse { data: receipt }))
}

/// GET /api/v1/collaborations/{id}/milestones
pub async fn list_milestones(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Milestone>>>> {
    let log = state.collaborations.list_milestones(&auth.actor, id).await?;
    Ok(Json(DataResponse { data: log }))
}

/// POST /api/v1/collaborations/{id}/milestones
pub async fn add_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(entry): Json<MilestoneEntry>,
) -> AppResult<(StatusCode, Json<DataResponse<Milestone>>)> {
    let milestone = state
        .collaborations
        .add_milestone(&auth.actor, id, entry)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: milestone })))
}
