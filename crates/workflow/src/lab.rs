//! Lab slot allocation.
//!
//! Any number of requests may be pending for the same `(lab, date, slot)`.
//! At most one of them can ever be approved: the check here gives a clear
//! error, and the store re-checks atomically when the status is written.

use std::sync::Arc;

use portal_core::actor::Actor;
use portal_core::error::{CoreError, StoreError};
use portal_core::lab_booking::{BookingRequest, LabBooking};
use portal_core::labs::{LabCatalog, SlotKey};
use portal_core::notify::Notifier;
use portal_core::status::{state_machine, ApprovalStatus};
use portal_core::store::{BookingFilter, PortalStore};
use portal_core::types::DbId;
use serde::Serialize;

use crate::{dispatch, messages};

/// Outcome of a batch withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalSummary {
    pub requested: usize,
    pub removed: u64,
}

#[derive(Clone)]
pub struct LabAllocator {
    store: Arc<dyn PortalStore>,
    notifier: Arc<dyn Notifier>,
    catalog: Arc<LabCatalog>,
}

impl LabAllocator {
    pub fn new(
        store: Arc<dyn PortalStore>,
        notifier: Arc<dyn Notifier>,
        catalog: Arc<LabCatalog>,
    ) -> Self {
        Self {
            store,
            notifier,
            catalog,
        }
    }

    pub fn catalog(&self) -> &LabCatalog {
        &self.catalog
    }

    /// File a `Pending` request for a slot.
    ///
    /// Fails with `Conflict` if the slot is already approved for someone.
    /// The lab's faculty contact and the requester are both notified.
    pub async fn book(
        &self,
        actor: &Actor,
        request: BookingRequest,
    ) -> Result<LabBooking, CoreError> {
        let input = request.into_new_booking(actor, &self.catalog)?;
        let project = self
            .store
            .find_project(input.project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: input.project_id,
            })?;
        self.ensure_slot_free(&input.slot_key(), None).await?;

        let booking = self.store.insert_booking(&input).await?;
        tracing::info!(
            booking_id = booking.id,
            lab = %booking.lab,
            date = %booking.date,
            slot = %booking.slot,
            owner_id = actor.id,
            "Lab booking requested"
        );

        let lab = self.catalog.require(&booking.lab)?;
        let notes = vec![
            messages::lab_request(&booking, lab, &project.title, actor),
            messages::lab_request_receipt(&booking, lab),
        ];
        dispatch::deliver_all(self.notifier.as_ref(), notes).await;
        Ok(booking)
    }

    /// Reviewer decision. The requester's confirmation address is notified.
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: DbId,
        status: ApprovalStatus,
    ) -> Result<LabBooking, CoreError> {
        actor.require_reviewer("review lab bookings")?;
        let booking = self.load(id).await?;
        state_machine::validate_decision("Lab booking", booking.status, status)?;
        if status == ApprovalStatus::Approved {
            self.ensure_slot_free(&booking.slot_key(), Some(booking.id))
                .await?;
        }

        let updated = self
            .store
            .update_booking_status(id, status)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => slot_taken(&booking.slot_key()),
                other => other.into(),
            })?
            .ok_or_else(|| {
                CoreError::InvalidState("Lab booking was decided concurrently".to_string())
            })?;
        tracing::info!(
            booking_id = updated.id,
            reviewer_id = actor.id,
            status = %updated.status,
            "Lab booking reviewed"
        );

        dispatch::deliver(self.notifier.as_ref(), messages::lab_decision(&updated)).await;
        Ok(updated)
    }

    /// Owner withdraws one of their own `Pending` requests.
    pub async fn withdraw(&self, actor: &Actor, id: DbId) -> Result<LabBooking, CoreError> {
        let booking = self.load(id).await?;
        if !booking.is_owned_by(actor) {
            return Err(CoreError::Forbidden(
                "Only the requester may withdraw a booking".to_string(),
            ));
        }
        if booking.status != ApprovalStatus::Pending {
            return Err(CoreError::InvalidState(format!(
                "Booking is already {}; only pending requests can be withdrawn",
                booking.status
            )));
        }
        if !self.store.delete_booking(id).await? {
            return Err(CoreError::NotFound {
                entity: "LabBooking",
                id,
            });
        }
        tracing::info!(booking_id = id, owner_id = actor.id, "Lab booking withdrawn");
        Ok(booking)
    }

    /// Withdraw every listed request that `actor` owns and is still
    /// `Pending`. Ineligible ids are skipped silently; `NoOp` if none were
    /// removed.
    pub async fn withdraw_batch(
        &self,
        actor: &Actor,
        ids: &[DbId],
    ) -> Result<WithdrawalSummary, CoreError> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let removed = if unique.is_empty() {
            0
        } else {
            self.store.delete_pending_bookings(actor.id, &unique).await?
        };
        if removed == 0 {
            return Err(CoreError::NoOp(
                "No pending bookings of yours matched the request".to_string(),
            ));
        }
        tracing::info!(
            owner_id = actor.id,
            requested = unique.len(),
            removed,
            "Lab bookings withdrawn in batch"
        );
        Ok(WithdrawalSummary {
            requested: unique.len(),
            removed,
        })
    }

    pub async fn list_owned(&self, actor: &Actor) -> Result<Vec<LabBooking>, CoreError> {
        let filter = BookingFilter {
            owner_id: Some(actor.id),
            ..Default::default()
        };
        Ok(self.store.list_bookings(&filter).await?)
    }

    /// Every booking, optionally narrowed to one status. Reviewers only.
    pub async fn list_all(
        &self,
        actor: &Actor,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<LabBooking>, CoreError> {
        actor.require_reviewer("list all lab bookings")?;
        let filter = BookingFilter {
            status,
            ..Default::default()
        };
        Ok(self.store.list_bookings(&filter).await?)
    }

    async fn ensure_slot_free(&self, key: &SlotKey, except: Option<DbId>) -> Result<(), CoreError> {
        match self.store.find_approved_booking(key).await? {
            Some(holder) if Some(holder.id) != except => Err(slot_taken(key)),
            _ => Ok(()),
        }
    }

    async fn load(&self, id: DbId) -> Result<LabBooking, CoreError> {
        self.store
            .find_booking(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "LabBooking",
                id,
            })
    }
}

fn slot_taken(key: &SlotKey) -> CoreError {
    CoreError::Conflict(format!(
        "Slot already booked: {} on {} at {}",
        key.lab, key.date, key.slot
    ))
}
