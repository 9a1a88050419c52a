//! Create `store_hours` table.
//!
//! One row per calendar day. Times are nullable so closed days need not carry them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StoreHours::Table)
                    .if_not_exists()
                    .col(uuid(StoreHours::Id).primary_key())
                    .col(date(StoreHours::Date).not_null())
                    .col(ColumnDef::new(StoreHours::OpenTime).time().null())
                    .col(ColumnDef::new(StoreHours::CloseTime).time().null())
                    .col(boolean(StoreHours::IsClosed).not_null())
                    .col(timestamp_with_time_zone(StoreHours::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(StoreHours::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StoreHours::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum StoreHours { Table, Id, Date, OpenTime, CloseTime, IsClosed, CreatedAt, UpdatedAt }
