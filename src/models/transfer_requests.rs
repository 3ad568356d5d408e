use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transfer status. Everything except `Pending` is terminal.
///
/// `Disputed` means the recipient received the pet but contests its
/// condition; `Rejected` means the recipient declined the handover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "disputed")]
    Disputed,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// SeaORM entity for the `transfer_requests` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub placement_request_id: Uuid,
    #[sea_orm(unique)]
    pub placement_request_response_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: Status,
    pub confirmed_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    pub disputed_at: Option<DateTimeUtc>,
    pub canceled_at: Option<DateTimeUtc>,
    /// The handover must be confirmed before this; the sweep expires it after.
    pub expires_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::placement_requests::Entity",
        from = "Column::PlacementRequestId",
        to = "super::placement_requests::Column::Id"
    )]
    PlacementRequest,
}

impl Related<super::placement_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlacementRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmTransfer {
    pub condition_confirmed: bool,
}
