//! Research portal domain core.
//!
//! Entity records, the approval status state machine, the error taxonomy,
//! and the seams (store and notifier traits) through which the workflow
//! managers reach persistence and mail delivery. This crate has no internal
//! dependencies so the db, events, workflow and api crates can all share it.

pub mod actor;
pub mod collaboration;
pub mod error;
pub mod lab_booking;
pub mod labs;
pub mod notify;
pub mod project;
pub mod roles;
pub mod status;
pub mod store;
pub mod types;
