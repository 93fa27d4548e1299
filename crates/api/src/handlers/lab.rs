//! Handlers for lab catalog and booking routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::lab_booking::{BookingRequest, LabBooking};
use portal_core::labs::Lab;
use portal_core::status::ApprovalStatus;
use portal_core::types::DbId;
use portal_workflow::WithdrawalSummary;
use serde::Deserialize;

use super::StatusUpdate;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /labs/bookings`.
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Deserialize)]
pub struct BatchWithdrawRequest {
    pub ids: Vec<DbId>,
}

/// GET /api/v1/labs
pub async fn list_labs(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Lab>>>> {
    Ok(Json(DataResponse {
        data: state.labs.catalog().labs().to_vec(),
    }))
}

/// POST /api/v1/labs/bookings
pub async fn book(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LabBooking>>)> {
    let booking = state.labs.book(&auth.actor, request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// GET /api/v1/labs/bookings?status=Pending
pub async fn list_bookings(
    RequireReviewer(auth): RequireReviewer,
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> AppResult<Json<DataResponse<Vec<LabBooking>>>> {
    let bookings = state.labs.list_all(&auth.actor, params.status).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/labs/bookings/mine
pub async fn list_my_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<LabBooking>>>> {
    let bookings = state.labs.list_owned(&auth.actor).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// PUT /api/v1/labs/bookings/{id}/status
pub async fn set_status(
    RequireReviewer(auth): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Json<DataResponse<LabBooking>>> {
    let booking = state.labs.set_status(&auth.actor, id, update.status).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// DELETE /api/v1/labs/bookings/{id}
///
/// Returns the withdrawn booking.
pub async fn withdraw(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LabBooking>>> {
    let booking = state.labs.withdraw(&auth.actor, id).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/labs/bookings/withdraw-batch
pub async fn withdraw_batch(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<BatchWithdrawRequest>,
) -> AppResult<Json<DataResponse<WithdrawalSummary>>> {
    let summary = state.labs.withdraw_batch(&auth.actor, &request.ids).await?;
    Ok(Json(DataResponse { data: summary }))
}
