//! Fleet module: scooter queries and partial updates
//!
//! `FleetService` is the single entry point HTTP handlers use to read the
//! fleet and to apply battery, location and reservation changes.

pub mod service;

pub use service::FleetService;
