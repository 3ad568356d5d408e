use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `placement_requests` table and its columns.
#[derive(DeriveIden)]
enum PlacementRequests {
    Table,
    Id,
    PetId,
    OwnerUserId,
    RequestType,
    Status,
    Notes,
    ExpiresAt,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Pets {
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
                    .table(PlacementRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlacementRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlacementRequests::PetId).uuid().not_null())
                    .col(
                        ColumnDef::new(PlacementRequests::OwnerUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequests::RequestType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlacementRequests::Status).string().not_null())
                    .col(ColumnDef::new(PlacementRequests::Notes).text().null())
                    .col(
                        ColumnDef::new(PlacementRequests::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(PlacementRequests::StartDate).date().null())
                    .col(ColumnDef::new(PlacementRequests::EndDate).date().null())
                    .col(
                        ColumnDef::new(PlacementRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlacementRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_placement_requests_pet_id")
                            .from(PlacementRequests::Table, PlacementRequests::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_placement_requests_owner_user_id")
                            .from(PlacementRequests::Table, PlacementRequests::OwnerUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One live request per (pet, type). Partial indexes are not expressible
        // through the index builder, so this goes out as raw SQL (valid on both
        // Postgres and SQLite).
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_placement_requests_active_unique \
                 ON placement_requests (pet_id, request_type) \
                 WHERE status IN ('open', 'pending_transfer', 'active')",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlacementRequests::Table).to_owned())
            .await
    }
}
