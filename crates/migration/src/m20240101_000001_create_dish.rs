//! Create `dish` table.
//! One row per priced menu item with creator attribution.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dish::Table)
                    .if_not_exists()
                    .col(pk_auto(Dish::Id))
                    .col(string_len(Dish::Name, 128).not_null())
                    .col(double(Dish::Cost).not_null())
                    .col(string_len(Dish::MadeBy, 128).not_null())
                    .to_owned(),
            )
            .await?;

        // The API layer pre-checks duplicates; this index is the guard
        // under concurrent creates.
        manager
            .create_index(
                Index::create()
                    .name("idx_dish_name_unique")
                    .table(Dish::Table)
                    .col(Dish::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Dish::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Dish {
    Table,
    Id,
    Name,
    Cost,
    MadeBy,
}
