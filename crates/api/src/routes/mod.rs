pub mod admin;
pub mod collaboration;
pub mod health;
pub mod lab;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route requires a Bearer token.
///
/// ```text
/// /projects                                 list, submit
/// /projects/mine                            caller's projects
/// /projects/approved-by-me                  decided by caller
/// /projects/{id}                            get, amend, remove
/// /projects/{id}/status                     decide (reviewers)
///
/// /labs                                     lab catalog
/// /labs/bookings                            request (POST), list all (reviewers)
/// /labs/bookings/mine                       caller's bookings
/// /labs/bookings/withdraw-batch             withdraw several (POST)
/// /labs/bookings/{id}                       withdraw (DELETE)
/// /labs/bookings/{id}/status                decide (reviewers)
///
/// /collaborations                           propose, list sent and received
/// /collaborations/incoming                  received only
/// /collaborations/{id}/status               accept or decline (receiver)
/// /collaborations/{id}/directives           message the sender (receiver)
/// /collaborations/{id}/milestones           list, add (parties)
///
/// /admin/summary                            portal analytics (principal)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/labs", lab::router())
        .nest("/collaborations", collaboration::router())
        .nest("/admin", admin::router())
}
