//! Reservation aggregate
//!
//! Contains the Reservation entity and the state machine deciding which
//! reserve/release transitions are legal.

pub mod engine;
pub mod model;

pub use engine::{transition, ReservationConflict};
pub use model::{Reservation, ReservationChange, ReservationIntent};
