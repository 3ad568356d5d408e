use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum TransferRequests {
    Table,
    Id,
    PlacementRequestId,
    PlacementRequestResponseId,
    FromUserId,
    ToUserId,
    Status,
    ConfirmedAt,
    RejectedAt,
    DisputedAt,
    CanceledAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlacementRequests {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PlacementRequestResponses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransferRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransferRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::PlacementRequestId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::PlacementRequestResponseId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TransferRequests::FromUserId).uuid().not_null())
                    .col(ColumnDef::new(TransferRequests::ToUserId).uuid().not_null())
                    .col(ColumnDef::new(TransferRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(TransferRequests::ConfirmedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::RejectedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::DisputedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::CanceledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_placement_request_id")
                            .from(TransferRequests::Table, TransferRequests::PlacementRequestId)
                            .to(PlacementRequests::Table, PlacementRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_response_id")
                            .from(
                                TransferRequests::Table,
                                TransferRequests::PlacementRequestResponseId,
                            )
                            .to(PlacementRequestResponses::Table, PlacementRequestResponses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_from_user_id")
                            .from(TransferRequests::Table, TransferRequests::FromUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_to_user_id")
                            .from(TransferRequests::Table, TransferRequests::ToUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransferRequests::Table).to_owned())
            .await
    }
}
