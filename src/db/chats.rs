use sea_orm::*;
use uuid::Uuid;

use crate::models::chats;

/// The chat between an owner and a helper scoped to one placement request.
pub async fn find_request_chat<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
    owner_user_id: Uuid,
    helper_user_id: Uuid,
) -> Result<Option<Uuid>, DbErr> {
    chats::Entity::find()
        .select_only()
        .column(chats::Column::Id)
        .filter(chats::Column::PlacementRequestId.eq(placement_request_id))
        .filter(chats::Column::OwnerUserId.eq(owner_user_id))
        .filter(chats::Column::HelperUserId.eq(helper_user_id))
        .into_tuple()
        .one(db)
        .await
}
