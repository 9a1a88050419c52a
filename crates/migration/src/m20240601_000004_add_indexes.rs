use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // StoreHours: at most one row per calendar day
        manager
            .create_index(
                Index::create()
                    .name("idx_store_hours_date_unique")
                    .table(StoreHours::Table)
                    .col(StoreHours::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_store_hours_date_unique").table(StoreHours::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StoreHours { Table, Date }
