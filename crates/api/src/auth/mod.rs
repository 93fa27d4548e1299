//! Bearer token handling.
//!
//! Accounts live outside the portal; the API only verifies tokens issued
//! for it and turns their claims into an [`Actor`](portal_core::actor::Actor).

pub mod jwt;
