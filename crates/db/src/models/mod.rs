//! Row structs for every table.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! a conversion into the corresponding `portal-core` type. Rows that fail
//! to convert (unknown status id, unknown slot label) are reported as
//! backend errors.

use portal_core::error::{CoreError, StoreError};

pub mod collaboration;
pub mod lab_booking;
pub mod project;

pub(crate) fn corrupt_row(table: &str, err: CoreError) -> StoreError {
    StoreError::Backend(format!("Unreadable {table} row: {err}"))
}
