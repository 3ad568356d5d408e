use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Chats {
    Table,
    Id,
    PlacementRequestId,
    OwnerUserId,
    HelperUserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlacementRequests {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Chats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Chats::PlacementRequestId).uuid().not_null())
                    .col(ColumnDef::new(Chats::OwnerUserId).uuid().not_null())
                    .col(ColumnDef::new(Chats::HelperUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Chats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chats_placement_request_id")
                            .from(Chats::Table, Chats::PlacementRequestId)
                            .to(PlacementRequests::Table, PlacementRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chats_request_parties_unique")
                    .table(Chats::Table)
                    .col(Chats::PlacementRequestId)
                    .col(Chats::OwnerUserId)
                    .col(Chats::HelperUserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chats::Table).to_owned())
            .await
    }
}
