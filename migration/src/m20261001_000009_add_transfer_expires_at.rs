use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum TransferRequests {
    Table,
    Status,
    ExpiresAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(TransferRequests::Table)
                    .add_column(
                        ColumnDef::new(TransferRequests::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Handover sweep
        manager
            .create_index(
                Index::create()
                    .name("idx_transfer_requests_status_expires_at")
                    .table(TransferRequests::Table)
                    .col(TransferRequests::Status)
                    .col(TransferRequests::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_transfer_requests_status_expires_at")
                    .table(TransferRequests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(TransferRequests::Table)
                    .drop_column(TransferRequests::ExpiresAt)
                    .to_owned(),
            )
            .await
    }
}
