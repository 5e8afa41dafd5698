//! Integration test utilities for the DM hub
//!
//! This crate provides helpers for running end-to-end tests against the
//! WebSocket gateway over in-memory stores.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
