//! Scooter endpoints: fleet listing, lookup and partial update

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
