//! Domain layer: fleet entities, validation rules, the reservation state
//! machine and the repository interfaces the application layer drives.

pub mod repositories;
pub mod reservation;
pub mod scooter;
pub mod user;

pub use repositories::{DomainResult, FleetTransaction, RepositoryProvider, ScooterRepository};
pub use reservation::{Reservation, ReservationChange, ReservationConflict, ReservationIntent};
pub use scooter::{Location, LocationAxis, Scooter, ScooterPatch, ScooterView, ValidationError};
pub use user::{User, UserRepository};

pub use crate::shared::errors::DomainError;
