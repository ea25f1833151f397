//! Scooter aggregate
//!
//! Contains the Scooter entity, its read view, the partial-update payload and
//! the field validators (battery range, coordinate range).

pub mod location;
pub mod model;

pub use location::{validate_battery, validate_location, LocationAxis, ValidationError};
pub use model::{Location, Scooter, ScooterPatch, ScooterView};
