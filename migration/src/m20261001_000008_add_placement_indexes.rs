use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PlacementRequests {
    Table,
    PetId,
    Status,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum PlacementRequestResponses {
    Table,
    PlacementRequestId,
    HelperProfileId,
}

#[derive(DeriveIden)]
enum TransferRequests {
    Table,
    PlacementRequestId,
}

#[derive(DeriveIden)]
enum PetRelationships {
    Table,
    PetId,
    RelationshipType,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Live-request lookups by pet
        manager
            .create_index(
                Index::create()
                    .name("idx_placement_requests_pet_status")
                    .table(PlacementRequests::Table)
                    .col(PlacementRequests::PetId)
                    .col(PlacementRequests::Status)
                    .to_owned(),
            )
            .await?;

        // Expiry sweep
        manager
            .create_index(
                Index::create()
                    .name("idx_placement_requests_status_expires_at")
                    .table(PlacementRequests::Table)
                    .col(PlacementRequests::Status)
                    .col(PlacementRequests::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_responses_request_helper")
                    .table(PlacementRequestResponses::Table)
                    .col(PlacementRequestResponses::PlacementRequestId)
                    .col(PlacementRequestResponses::HelperProfileId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transfer_requests_placement_request_id")
                    .table(TransferRequests::Table)
                    .col(TransferRequests::PlacementRequestId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pet_relationships_pet_type")
                    .table(PetRelationships::Table)
                    .col(PetRelationships::PetId)
                    .col(PetRelationships::RelationshipType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_pet_relationships_pet_type")
                    .table(PetRelationships::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_transfer_requests_placement_request_id")
                    .table(TransferRequests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_responses_request_helper")
                    .table(PlacementRequestResponses::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_placement_requests_status_expires_at")
                    .table(PlacementRequests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_placement_requests_pet_status")
                    .table(PlacementRequests::Table)
                    .to_owned(),
            )
            .await
    }
}
