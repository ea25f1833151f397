//! Identity module: authentication & user profile
//!
//! Contains the `IdentityService` which resolves request credentials
//! (HTTP Basic or a bearer JWT) to a `User` and issues login tokens.

pub mod service;

pub use service::{AuthResult, IdentityService};
