//! Route definitions for `/admin`.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /summary    -> summary (principal)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(admin::summary))
}
