//! Lab catalog and bookable time slots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A fixed two-hour booking window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "10:00-12:00")]
    Morning,
    #[serde(rename = "14:00-16:00")]
    Afternoon,
    #[serde(rename = "16:00-18:00")]
    Evening,
}

/// Every bookable slot, in day order.
pub const ALL_SLOTS: &[TimeSlot] = &[TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

impl TimeSlot {
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "10:00-12:00",
            TimeSlot::Afternoon => "14:00-16:00",
            TimeSlot::Evening => "16:00-18:00",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        ALL_SLOTS
            .iter()
            .copied()
            .find(|slot| slot.label() == label)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid time slot '{label}'. Must be one of: {}",
                    ALL_SLOTS
                        .iter()
                        .map(|s| s.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The contended resource: one lab on one date in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SlotKey {
    pub lab: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// A bookable lab and the faculty member who receives its requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub name: String,
    pub faculty_email: String,
}

impl Lab {
    fn new(id: &str, name: &str, faculty_email: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            faculty_email: faculty_email.to_string(),
        }
    }
}

/// The set of labs that accept bookings.
#[derive(Debug, Clone, Serialize)]
pub struct LabCatalog {
    labs: Vec<Lab>,
}

impl LabCatalog {
    pub fn new(labs: Vec<Lab>) -> Self {
        Self { labs }
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn find(&self, id: &str) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.id == id)
    }

    /// Look up a lab, failing with a validation error for unknown ids.
    pub fn require(&self, id: &str) -> Result<&Lab, CoreError> {
        self.find(id).ok_or_else(|| {
            CoreError::Validation(format!(
                "Unknown lab '{id}'. Must be one of: {}",
                self.labs
                    .iter()
                    .map(|l| l.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

impl Default for LabCatalog {
    fn default() -> Self {
        Self::new(vec![
            Lab::new("IoT", "IoT Lab (Dept IT)", "iot.lab@portal.local"),
            Lab::new("AI-ML", "AI/ML Lab (Dept CS)", "aiml.lab@portal.local"),
            Lab::new(
                "Fluid-Mechanics",
                "Fluid Mechanics Lab (Dept Civil)",
                "civil.lab@portal.local",
            ),
            Lab::new(
                "High-Voltage",
                "High Voltage Lab (Dept Electrical)",
                "electrical.lab@portal.local",
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_labels_round_trip() {
        for slot in ALL_SLOTS {
            assert_eq!(TimeSlot::from_label(slot.label()).unwrap(), *slot);
        }
    }

    #[test]
    fn unknown_slot_label_rejected() {
        let err = TimeSlot::from_label("09:00-10:00").unwrap_err();
        assert!(err.to_string().contains("Invalid time slot"));
    }

    #[test]
    fn slot_serializes_as_label() {
        let json = serde_json::to_string(&TimeSlot::Morning).unwrap();
        assert_eq!(json, "\"10:00-12:00\"");
        let slot: TimeSlot = serde_json::from_str("\"16:00-18:00\"").unwrap();
        assert_eq!(slot, TimeSlot::Evening);
    }

    #[test]
    fn default_catalog_has_iot_lab() {
        let catalog = LabCatalog::default();
        assert_eq!(catalog.labs().len(), 4);
        assert!(catalog.require("IoT").is_ok());
    }

    #[test]
    fn unknown_lab_is_validation_error() {
        let catalog = LabCatalog::default();
        let err = catalog.require("Chemistry").unwrap_err();
        assert!(err.to_string().contains("Unknown lab 'Chemistry'"));
    }
}
