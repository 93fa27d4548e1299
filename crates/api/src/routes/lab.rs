//! Route definitions for the `/labs` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::lab;
use crate::state::AppState;

/// Routes mounted at `/labs`.
///
/// ```text
/// GET    /                           -> list_labs
/// GET    /bookings                   -> list_bookings (reviewers)
/// POST   /bookings                   -> book
/// GET    /bookings/mine              -> list_my_bookings
/// POST   /bookings/withdraw-batch    -> withdraw_batch
/// DELETE /bookings/{id}              -> withdraw
/// PUT    /bookings/{id}/status       -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lab::list_labs))
        .route("/bookings", get(lab::list_bookings).post(lab::book))
        .route("/bookings/mine", get(lab::list_my_bookings))
        .route("/bookings/withdraw-batch", post(lab::withdraw_batch))
        .route("/bookings/{id}", delete(lab::withdraw))
        .route("/bookings/{id}/status", put(lab::set_status))
}
