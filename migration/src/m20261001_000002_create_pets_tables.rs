use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PetTypes {
    Table,
    Id,
    Name,
    Slug,
    PlacementRequestsAllowed,
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    Id,
    Name,
    PetTypeId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum HelperProfiles {
    Table,
    Id,
    UserId,
    City,
    Bio,
    CreatedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
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
                    .table(PetTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PetTypes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PetTypes::Name).string().not_null())
                    .col(ColumnDef::new(PetTypes::Slug).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(PetTypes::PlacementRequestsAllowed)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Pets::Name).string().not_null())
                    .col(ColumnDef::new(Pets::PetTypeId).uuid().not_null())
                    .col(
                        ColumnDef::new(Pets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pets_pet_type_id")
                            .from(Pets::Table, Pets::PetTypeId)
                            .to(PetTypes::Table, PetTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HelperProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HelperProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HelperProfiles::UserId).uuid().not_null())
                    .col(ColumnDef::new(HelperProfiles::City).string().null())
                    .col(ColumnDef::new(HelperProfiles::Bio).text().null())
                    .col(
                        ColumnDef::new(HelperProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_helper_profiles_user_id")
                            .from(HelperProfiles::Table, HelperProfiles::UserId)
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
            .drop_table(Table::drop().table(HelperProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PetTypes::Table).to_owned())
            .await
    }
}
