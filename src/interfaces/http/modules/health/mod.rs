//! Liveness and store reachability

pub mod handlers;

pub use handlers::*;
