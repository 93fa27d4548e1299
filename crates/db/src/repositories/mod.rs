//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument and return `sqlx::Error`.

pub mod collaboration_repo;
pub mod lab_booking_repo;
pub mod project_repo;

pub use collaboration_repo::{CollaborationRepo, MilestoneRepo};
pub use lab_booking_repo::LabBookingRepo;
pub use project_repo::{ProjectHistoryRepo, ProjectRepo};
