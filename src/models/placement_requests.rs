use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The kind of arrangement an owner is offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[sea_orm(string_value = "permanent")]
    Permanent,
    #[sea_orm(string_value = "foster_free")]
    FosterFree,
    #[sea_orm(string_value = "foster_paid")]
    FosterPaid,
    #[sea_orm(string_value = "pet_sitting")]
    PetSitting,
}

impl RequestType {
    /// Whether accepting a response leads to a physical handover that the
    /// helper has to confirm.
    pub fn requires_handover(self) -> bool {
        matches!(self, Self::Permanent | Self::FosterFree | Self::FosterPaid)
    }

    /// Temporary arrangements end with the owner finalizing them.
    pub fn is_temporary(self) -> bool {
        !matches!(self, Self::Permanent)
    }

    /// Foster arrangements hand physical custody over without ownership.
    pub fn is_foster(self) -> bool {
        matches!(self, Self::FosterFree | Self::FosterPaid)
    }
}

/// Placement request status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "pending_transfer")]
    PendingTransfer,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "finalized")]
    Finalized,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Status {
    /// Statuses that count against the one-live-request-per-type rule.
    pub const LIVE: [Status; 3] = [Status::Open, Status::PendingTransfer, Status::Active];

    pub fn is_live(self) -> bool {
        Self::LIVE.contains(&self)
    }
}

/// SeaORM entity for the `placement_requests` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "placement_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_user_id: Uuid,
    pub request_type: RequestType,
    pub status: Status,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pets::Entity",
        from = "Column::PetId",
        to = "super::pets::Column::Id"
    )]
    Pet,
    #[sea_orm(has_many = "super::placement_request_responses::Entity")]
    Responses,
    #[sea_orm(has_many = "super::transfer_requests::Entity")]
    TransferRequests,
}

impl Related<super::pets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pet.def()
    }
}

impl Related<super::placement_request_responses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responses.def()
    }
}

impl Related<super::transfer_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlacementRequest {
    pub pet_id: Uuid,
    pub request_type: RequestType,
    pub notes: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}
