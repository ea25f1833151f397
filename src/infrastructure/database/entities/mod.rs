//! Database entities module

pub mod reservation;
pub mod scooter;
pub mod user;

pub use reservation::Entity as Reservation;
pub use scooter::Entity as Scooter;
pub use user::Entity as User;
