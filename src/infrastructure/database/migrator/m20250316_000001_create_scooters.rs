//! Create scooters table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scooters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scooters::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Scooters::BatteryLevel)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(ColumnDef::new(Scooters::Latitude).double().not_null())
                    .col(ColumnDef::new(Scooters::Longitude).double().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Scooters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Scooters {
    Table,
    Id,
    BatteryLevel,
    Latitude,
    Longitude,
}
