use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PetRelationships {
    Table,
    Id,
    PetId,
    UserId,
    RelationshipType,
    StartAt,
    EndAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FosterAssignments {
    Table,
    Id,
    PetId,
    OwnerUserId,
    FosterUserId,
    TransferRequestId,
    StartDate,
    ExpectedEndDate,
    ActualEndDate,
    Status,
    CreatedAt,
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
                    .table(PetRelationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PetRelationships::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PetRelationships::PetId).uuid().not_null())
                    .col(ColumnDef::new(PetRelationships::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(PetRelationships::RelationshipType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PetRelationships::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PetRelationships::EndAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PetRelationships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pet_relationships_pet_id")
                            .from(PetRelationships::Table, PetRelationships::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pet_relationships_user_id")
                            .from(PetRelationships::Table, PetRelationships::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Exactly one current owner per pet.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_pet_relationships_open_owner \
                 ON pet_relationships (pet_id) \
                 WHERE relationship_type = 'owner' AND end_at IS NULL",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FosterAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FosterAssignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FosterAssignments::PetId).uuid().not_null())
                    .col(
                        ColumnDef::new(FosterAssignments::OwnerUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FosterAssignments::FosterUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FosterAssignments::TransferRequestId)
                            .uuid()
                            .null(),
                    )
                    .col(ColumnDef::new(FosterAssignments::StartDate).date().not_null())
                    .col(ColumnDef::new(FosterAssignments::ExpectedEndDate).date().null())
                    .col(ColumnDef::new(FosterAssignments::ActualEndDate).date().null())
                    .col(ColumnDef::new(FosterAssignments::Status).string().not_null())
                    .col(
                        ColumnDef::new(FosterAssignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_foster_assignments_pet_id")
                            .from(FosterAssignments::Table, FosterAssignments::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_foster_assignments_pet_status")
                    .table(FosterAssignments::Table)
                    .col(FosterAssignments::PetId)
                    .col(FosterAssignments::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FosterAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PetRelationships::Table).to_owned())
            .await
    }
}
