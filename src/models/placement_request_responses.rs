use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Response status stored as a lowercase string in the database.
///
/// `Rejected` is final and blocks the helper profile on the request for good;
/// `Cancelled` is final for this row only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "responded")]
    Responded,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Status {
    pub const LIVE: [Status; 2] = [Status::Responded, Status::Accepted];

    pub fn is_live(self) -> bool {
        Self::LIVE.contains(&self)
    }
}

/// SeaORM entity for the `placement_request_responses` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "placement_request_responses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub placement_request_id: Uuid,
    pub helper_profile_id: Uuid,
    pub status: Status,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub responded_at: DateTimeUtc,
    pub accepted_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::placement_requests::Entity",
        from = "Column::PlacementRequestId",
        to = "super::placement_requests::Column::Id"
    )]
    PlacementRequest,
    #[sea_orm(
        belongs_to = "super::helper_profiles::Entity",
        from = "Column::HelperProfileId",
        to = "super::helper_profiles::Column::Id"
    )]
    HelperProfile,
}

impl Related<super::placement_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlacementRequest.def()
    }
}

impl Related<super::helper_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HelperProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct RespondToPlacementRequest {
    pub helper_profile_id: Uuid,
    pub message: Option<String>,
}
