//! Route definitions for the `/projects` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> submit
/// GET    /mine              -> list_mine
/// GET    /approved-by-me    -> list_approved_by_me
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> amend
/// DELETE /{id}              -> remove
/// PUT    /{id}/status       -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::submit))
        .route("/mine", get(project::list_mine))
        .route("/approved-by-me", get(project::list_approved_by_me))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::amend)
                .delete(project::remove),
        )
        .route("/{id}/status", put(project::set_status))
}
