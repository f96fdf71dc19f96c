use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Ratings::Table)
                    .col(Ratings::StoreId)
                    .name("idx_ratings_store_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Stores::Table)
                    .col(Stores::OwnerId)
                    .name("idx_stores_owner_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_stores_owner_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ratings_store_id").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ratings {
    Table,
    StoreId,
}

#[derive(Iden)]
enum Stores {
    Table,
    OwnerId,
}
