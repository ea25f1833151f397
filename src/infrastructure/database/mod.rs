pub mod entities;
pub mod migrator;
pub mod repositories;
pub mod seed;

pub use repositories::SeaOrmRepositoryProvider;
pub use seed::{seed_database, FleetSeed};

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./scooters.db?mode=rwc")
    pub url: String,
    /// Drop and recreate every table before use
    pub reset_on_start: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./scooters.db?mode=rwc".to_string(),
            reset_on_start: true,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Self::default()
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(&config.url).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Bring the schema up to date, wiping it first when `reset` is set.
pub async fn prepare_schema(db: &DatabaseConnection, reset: bool) -> Result<(), DbErr> {
    if reset {
        info!("Resetting database schema");
        Migrator::fresh(db).await
    } else {
        info!("Running database migrations");
        Migrator::up(db, None).await
    }
}

/// Fresh in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn test_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}
