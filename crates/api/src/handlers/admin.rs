//! Handlers for `/admin`.

use axum::extract::State;
use axum::Json;
use portal_workflow::PortalSummary;

use crate::error::AppResult;
use crate::middleware::rbac::RequirePrincipal;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/summary
pub async fn summary(
    RequirePrincipal(auth): RequirePrincipal,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PortalSummary>>> {
    let summary = state.analytics.summary(&auth.actor).await?;
    Ok(Json(DataResponse { data: summary }))
}
