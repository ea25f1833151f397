//! # Scooter Fleet Service
//!
//! HTTP service for tracking a scooter fleet (battery, location) and letting
//! authenticated users reserve and release scooters.
//!
//! ## Architecture
//!
//! - **domain**: Scooter, user and reservation entities, validation rules,
//!   the reservation state machine and repository traits
//! - **application**: Fleet update orchestration and identity services
//! - **infrastructure**: SeaORM/SQLite and in-memory stores, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Error types, the `Patch` wrapper, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, prepare_schema, DatabaseConfig, InMemoryRepositoryProvider,
    SeaOrmRepositoryProvider,
};

// Re-export API router
pub use interfaces::http::create_api_router;
