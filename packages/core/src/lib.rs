//! Pure-logic core of the sensor network dashboard.
//!
//! This crate has **no I/O** — no networking, no storage, no async runtime.
//! It defines the internal shapes the rest of the workspace agrees on and the
//! policies that do not depend on how bytes move:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | [`Session`], [`Network`], [`SessionLookup`], [`AuthenticationState`] |
//! | [`failure`] | Classification of failed fetches into [`FailureClass`] and the matching [`Notice`] |
//! | [`render`] | Plain-text network cards for terminal front-ends |
//!
//! The wire format of the remote API (snake_case field names) lives in
//! `sensordash-api`; everything here uses the internal naming convention.

pub mod failure;
pub mod render;
pub mod types;

pub use failure::{FailureClass, Notice};
pub use types::{AuthenticationState, Network, Session, SessionLookup};
