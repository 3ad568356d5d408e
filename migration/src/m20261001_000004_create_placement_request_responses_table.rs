use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PlacementRequestResponses {
    Table,
    Id,
    PlacementRequestId,
    HelperProfileId,
    Status,
    Message,
    RespondedAt,
    AcceptedAt,
    RejectedAt,
    CancelledAt,
}

#[derive(DeriveIden)]
enum PlacementRequests {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum HelperProfiles {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlacementRequestResponses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlacementRequestResponses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequestResponses::PlacementRequestId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequestResponses::HelperProfileId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequestResponses::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlacementRequestResponses::Message).text().null())
                    .col(
                        ColumnDef::new(PlacementRequestResponses::RespondedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequestResponses::AcceptedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequestResponses::RejectedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequestResponses::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_responses_placement_request_id")
                            .from(
                                PlacementRequestResponses::Table,
                                PlacementRequestResponses::PlacementRequestId,
                            )
                            .to(PlacementRequests::Table, PlacementRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_responses_helper_profile_id")
                            .from(
                                PlacementRequestResponses::Table,
                                PlacementRequestResponses::HelperProfileId,
                            )
                            .to(HelperProfiles::Table, HelperProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A helper profile holds at most one live response per request.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_responses_live_helper_unique \
                 ON placement_request_responses (placement_request_id, helper_profile_id) \
                 WHERE status IN ('responded', 'accepted')",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(PlacementRequestResponses::Table)
                    .to_owned(),
            )
            .await
    }
}
