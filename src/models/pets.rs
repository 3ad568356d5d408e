use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `pets` table.
///
/// Ownership is not a column: the current owner is the open `owner` edge in
/// `pet_relationships`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub pet_type_id: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pet_types::Entity",
        from = "Column::PetTypeId",
        to = "super::pet_types::Column::Id"
    )]
    PetType,
    #[sea_orm(has_many = "super::placement_requests::Entity")]
    PlacementRequests,
    #[sea_orm(has_many = "super::pet_relationships::Entity")]
    Relationships,
}

impl Related<super::pet_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetType.def()
    }
}

impl Related<super::placement_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlacementRequests.def()
    }
}

impl Related<super::pet_relationships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relationships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
