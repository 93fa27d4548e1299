//! Route definitions for the `/collaborations` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::collaboration;
use crate::state::AppState;

/// Routes mounted at `/collaborations`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> propose
/// GET    /incoming             -> list_incoming
/// PUT    /{id}/status          -> resolve
/// POST   /{id}/directives      -> issue_directive
/// GET    /{id}/milestones      -> list_milestones
/// POST   /{id}/milestones      -> add_milestone
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(collaboration::list).post(collaboration::propose))
        .route("/incoming", get(collaboration::list_incoming))
        .route("/{id}/status", put(collaboration::resolve))
        .route("/{id}/directives", post(collaboration::issue_directive))
        .route(
            "/{id}/milestones",
            get(collaboration::list_milestones).post(collaboration::add_milestone),
        )
}
