//! User aggregate
//!
//! Contains the User entity and the directory interface used for
//! credential lookup.

pub mod model;
pub mod repository;

pub use model::User;
pub use repository::UserRepository;
