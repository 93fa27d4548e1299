//! `lab_bookings` rows.

use chrono::NaiveDate;
use portal_core::error::StoreError;
use portal_core::lab_booking::LabBooking;
use portal_core::labs::TimeSlot;
use portal_core::status::{ApprovalStatus, StatusId};
use portal_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::corrupt_row;

/// A row from the `lab_bookings` table. `time_slot` stores the slot label.
#[derive(Debug, Clone, FromRow)]
pub struct LabBookingRow {
    pub id: DbId,
    pub lab: String,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub reason: String,
    pub owner_id: DbId,
    pub owner_name: String,
    pub project_id: DbId,
    pub status_id: StatusId,
    pub confirmation_email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<LabBookingRow> for LabBooking {
    type Error = StoreError;

    fn try_from(row: LabBookingRow) -> Result<Self, Self::Error> {
        Ok(LabBooking {
            id: row.id,
            lab: row.lab,
            date: row.booking_date,
            slot: TimeSlot::from_label(&row.time_slot)
                .map_err(|e| corrupt_row("lab_bookings", e))?,
            reason: row.reason,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            project_id: row.project_id,
            status: ApprovalStatus::from_id(row.status_id)
                .map_err(|e| corrupt_row("lab_bookings", e))?,
            confirmation_email: row.confirmation_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
