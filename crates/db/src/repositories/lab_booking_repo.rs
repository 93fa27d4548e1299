//! Repository for the `lab_bookings` table.

use portal_core::lab_booking::NewLabBooking;
use portal_core::labs::SlotKey;
use portal_core::status::{ApprovalStatus, StatusId};
use portal_core::store::BookingFilter;
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::lab_booking::LabBookingRow;

/// Column list for `lab_bookings` queries.
const COLUMNS: &str = "id, lab, booking_date, time_slot, reason, owner_id, owner_name, \
                       project_id, status_id, confirmation_email, created_at, updated_at";

pub struct LabBookingRepo;

impl LabBookingRepo {
    /// Insert a `Pending` booking.
    pub async fn create(pool: &PgPool, input: &NewLabBooking) -> Result<LabBookingRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO lab_bookings \
                (lab, booking_date, time_slot, reason, owner_id, owner_name, \
                 project_id, confirmation_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LabBookingRow>(&query)
            .bind(&input.lab)
            .bind(input.date)
            .bind(input.slot.label())
            .bind(&input.reason)
            .bind(input.owner_id)
            .bind(&input.owner_name)
            .bind(input.project_id)
            .bind(&input.confirmation_email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LabBookingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lab_bookings WHERE id = $1");
        sqlx::query_as::<_, LabBookingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The approved booking holding a slot, if any.
    pub async fn find_approved_for_slot(
        pool: &PgPool,
        key: &SlotKey,
    ) -> Result<Option<LabBookingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lab_bookings \
             WHERE lab = $1 AND booking_date = $2 AND time_slot = $3 AND status_id = $4"
        );
        sqlx::query_as::<_, LabBookingRow>(&query)
            .bind(&key.lab)
            .bind(key.date)
            .bind(key.slot.label())
            .bind(ApprovalStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }

    /// Set a booking's status.
    ///
    /// Approving into a held slot violates `uq_lab_bookings_approved_slot`
    /// and surfaces as a database error with code 23505.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
    ) -> Result<Option<LabBookingRow>, sqlx::Error> {
        let query = format!(
            "UPDATE lab_bookings SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LabBookingRow>(&query)
            .bind(id)
            .bind(status_id)
            .bind(ApprovalStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lab_bookings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the listed bookings that belong to `owner_id` and are still
    /// pending, in a single statement. Returns the number removed.
    pub async fn delete_pending_owned(
        pool: &PgPool,
        owner_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM lab_bookings \
             WHERE id = ANY($1) AND owner_id = $2 AND status_id = $3",
        )
        .bind(ids)
        .bind(owner_id)
        .bind(ApprovalStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Newest first. Unset filter fields match everything.
    pub async fn list(pool: &PgPool, filter: &BookingFilter) -> Result<Vec<LabBookingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lab_bookings \
             WHERE ($1::BIGINT IS NULL OR owner_id = $1) \
               AND ($2::SMALLINT IS NULL OR status_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, LabBookingRow>(&query)
            .bind(filter.owner_id)
            .bind(filter.status.map(ApprovalStatus::id))
            .bind(filter.limit)
            .fetch_all(pool)
            .await
    }
}
