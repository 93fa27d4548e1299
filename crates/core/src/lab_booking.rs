//! Lab slot reservations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::actor::Actor;
use crate::error::CoreError;
use crate::labs::{LabCatalog, SlotKey, TimeSlot};
use crate::status::ApprovalStatus;
use crate::types::{DbId, Timestamp};

/// A reservation request for one lab slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabBooking {
    pub id: DbId,
    pub lab: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub reason: String,
    pub owner_id: DbId,
    pub owner_name: String,
    pub project_id: DbId,
    pub status: ApprovalStatus,
    /// Address the requester asked to be notified at.
    pub confirmation_email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LabBooking {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            lab: self.lab.clone(),
            date: self.date,
            slot: self.slot,
        }
    }

    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        self.owner_id == actor.id
    }
}

/// Payload for requesting a lab slot.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 1, max = 80))]
    pub lab: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
    pub project_id: Option<DbId>,
    #[validate(email)]
    pub confirmation_email: Option<String>,
}

/// A validated booking ready to be inserted by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLabBooking {
    pub lab: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub reason: String,
    pub owner_id: DbId,
    pub owner_name: String,
    pub project_id: DbId,
    pub confirmation_email: String,
}

impl NewLabBooking {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            lab: self.lab.clone(),
            date: self.date,
            slot: self.slot,
        }
    }
}

impl BookingRequest {
    /// Validate the request against the lab catalog and build the insert.
    ///
    /// The confirmation address defaults to the requester's own email.
    pub fn into_new_booking(
        self,
        actor: &Actor,
        catalog: &LabCatalog,
    ) -> Result<NewLabBooking, CoreError> {
        let project_id = self
            .project_id
            .ok_or_else(|| CoreError::Validation("Please select a project".to_string()))?;
        self.validate()?;
        catalog.require(&self.lab)?;
        if self.reason.trim().is_empty() {
            return Err(CoreError::Validation("reason must not be blank".to_string()));
        }

        let confirmation_email = self
            .confirmation_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| actor.email.clone());

        Ok(NewLabBooking {
            lab: self.lab,
            date: self.date,
            slot: self.slot,
            reason: self.reason.trim().to_string(),
            owner_id: actor.id,
            owner_name: actor.name.clone(),
            project_id,
            confirmation_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::roles::Role;

    fn student() -> Actor {
        Actor::new(3, Role::Student, "stu@uni.edu", "Stu")
    }

    fn request() -> BookingRequest {
        BookingRequest {
            lab: "IoT".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            slot: TimeSlot::Morning,
            reason: "Sensor calibration".into(),
            project_id: Some(9),
            confirmation_email: None,
        }
    }

    #[test]
    fn missing_project_is_validation_error() {
        let mut req = request();
        req.project_id = None;
        assert_matches!(
            req.into_new_booking(&student(), &LabCatalog::default()),
            Err(CoreError::Validation(msg)) if msg.contains("project")
        );
    }

    #[test]
    fn unknown_lab_is_validation_error() {
        let mut req = request();
        req.lab = "Kitchen".into();
        assert_matches!(
            req.into_new_booking(&student(), &LabCatalog::default()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn confirmation_email_defaults_to_actor() {
        let booking = request()
            .into_new_booking(&student(), &LabCatalog::default())
            .unwrap();
        assert_eq!(booking.confirmation_email, "stu@uni.edu");
        assert_eq!(booking.owner_id, 3);
        assert_eq!(booking.project_id, 9);
    }

    #[test]
    fn malformed_confirmation_email_rejected() {
        let mut req = request();
        req.confirmation_email = Some("nope".into());
        assert_matches!(
            req.into_new_booking(&student(), &LabCatalog::default()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn blank_reason_rejected() {
        let mut req = request();
        req.reason = "  ".into();
        assert_matches!(
            req.into_new_booking(&student(), &LabCatalog::default()),
            Err(CoreError::Validation(_))
        );
    }
}
