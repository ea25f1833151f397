//! Application layer - use-case orchestration over the domain

pub mod fleet;
pub mod identity;

pub use fleet::FleetService;
pub use identity::{AuthResult, IdentityService};
