//! Core engine for the barangay records portal.
//!
//! The portal's forms, registries, and print templates live elsewhere; this
//! crate carries the document request lifecycle: fee and priority quoting,
//! the status state machine, list/filter queries, dashboard statistics, and
//! the citizen-facing tracking lookup.

pub mod config;
pub mod error;
pub mod requests;
pub mod telemetry;
