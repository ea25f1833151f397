//! SeaORM implementation of RepositoryProvider

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::repositories::{DomainResult, RepositoryProvider, ScooterRepository};
use crate::domain::UserRepository;

use super::scooter_repository::SeaOrmScooterRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let scooter = repos.scooters().find_by_id("abc123").await?;
/// let user = repos.users().find_by_name("basic").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    scooters: SeaOrmScooterRepository,
    users: SeaOrmUserRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            scooters: SeaOrmScooterRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn scooters(&self) -> &dyn ScooterRepository {
        &self.scooters
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db.ping().await?;
        Ok(())
    }
}
