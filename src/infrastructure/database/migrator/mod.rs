//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250316_000001_create_scooters;
mod m20250316_000002_create_users;
mod m20250316_000003_create_reservations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250316_000001_create_scooters::Migration),
            Box::new(m20250316_000002_create_users::Migration),
            Box::new(m20250316_000003_create_reservations::Migration),
        ]
    }
}
