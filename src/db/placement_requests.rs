use sea_orm::*;
use uuid::Uuid;

use crate::models::placement_requests::{self, CreatePlacementRequest, RequestType, Status};

/// Insert a new placement request in `Open` status.
pub async fn insert_placement_request<C: ConnectionTrait>(
    db: &C,
    input: CreatePlacementRequest,
    owner_user_id: Uuid,
) -> Result<placement_requests::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_request = placement_requests::ActiveModel {
        id: Set(Uuid::new_v4()),
        pet_id: Set(input.pet_id),
        owner_user_id: Set(owner_user_id),
        request_type: Set(input.request_type),
        status: Set(Status::Open),
        notes: Set(input.notes),
        expires_at: Set(input.expires_at),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_request.insert(db).await
}

/// Fetch a single placement request by ID.
pub async fn get_placement_request_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<placement_requests::Model>, DbErr> {
    placement_requests::Entity::find_by_id(id).one(db).await
}

/// Fetch and row-lock a placement request for the rest of the transaction.
pub async fn lock_placement_request<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<placement_requests::Model>, DbErr> {
    placement_requests::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await
}

/// Whether the pet already has a live request of the given type.
pub async fn live_request_exists<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
    request_type: RequestType,
) -> Result<bool, DbErr> {
    let count = placement_requests::Entity::find()
        .filter(placement_requests::Column::PetId.eq(pet_id))
        .filter(placement_requests::Column::RequestType.eq(request_type))
        .filter(placement_requests::Column::Status.is_in(Status::LIVE))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Every live request on a pet, any type.
pub async fn get_live_requests_for_pet<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
) -> Result<Vec<placement_requests::Model>, DbErr> {
    placement_requests::Entity::find()
        .filter(placement_requests::Column::PetId.eq(pet_id))
        .filter(placement_requests::Column::Status.is_in(Status::LIVE))
        .order_by_asc(placement_requests::Column::CreatedAt)
        .all(db)
        .await
}

/// Move a request to a new status.
pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    request: placement_requests::Model,
    status: Status,
) -> Result<placement_requests::Model, DbErr> {
    let mut active: placement_requests::ActiveModel = request.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}

/// IDs of open requests whose `expires_at` has passed.
pub async fn get_overdue_open_ids<C: ConnectionTrait>(
    db: &C,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<Uuid>, DbErr> {
    placement_requests::Entity::find()
        .select_only()
        .column(placement_requests::Column::Id)
        .filter(placement_requests::Column::Status.eq(Status::Open))
        .filter(placement_requests::Column::ExpiresAt.lte(now))
        .order_by_asc(placement_requests::Column::ExpiresAt)
        .into_tuple()
        .all(db)
        .await
}
