use sea_orm::*;
use uuid::Uuid;

use crate::models::transfer_requests::{self, Status};

/// Insert a new `Pending` transfer for an accepted response.
pub async fn insert_transfer<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
    placement_request_response_id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<transfer_requests::Model, DbErr> {
    let new_transfer = transfer_requests::ActiveModel {
        id: Set(Uuid::new_v4()),
        placement_request_id: Set(placement_request_id),
        placement_request_response_id: Set(placement_request_response_id),
        from_user_id: Set(from_user_id),
        to_user_id: Set(to_user_id),
        status: Set(Status::Pending),
        confirmed_at: Set(None),
        rejected_at: Set(None),
        disputed_at: Set(None),
        canceled_at: Set(None),
        expires_at: Set(expires_at),
        created_at: Set(chrono::Utc::now()),
    };

    new_transfer.insert(db).await
}

/// Fetch a single transfer by ID.
pub async fn get_transfer_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<transfer_requests::Model>, DbErr> {
    transfer_requests::Entity::find_by_id(id).one(db).await
}

/// Fetch and row-lock a transfer for the rest of the transaction.
pub async fn lock_transfer<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<transfer_requests::Model>, DbErr> {
    transfer_requests::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await
}

/// All transfers on a request, oldest first.
pub async fn get_transfers_by_request<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
) -> Result<Vec<transfer_requests::Model>, DbErr> {
    transfer_requests::Entity::find()
        .filter(transfer_requests::Column::PlacementRequestId.eq(placement_request_id))
        .order_by_asc(transfer_requests::Column::CreatedAt)
        .all(db)
        .await
}

/// The pending transfer on a request, if any.
pub async fn get_pending_transfer<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
) -> Result<Option<transfer_requests::Model>, DbErr> {
    transfer_requests::Entity::find()
        .filter(transfer_requests::Column::PlacementRequestId.eq(placement_request_id))
        .filter(transfer_requests::Column::Status.eq(Status::Pending))
        .one(db)
        .await
}

/// (request id, transfer id) of pending transfers whose `expires_at` has passed.
pub async fn get_overdue_pending<C: ConnectionTrait>(
    db: &C,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<(Uuid, Uuid)>, DbErr> {
    transfer_requests::Entity::find()
        .select_only()
        .column(transfer_requests::Column::PlacementRequestId)
        .column(transfer_requests::Column::Id)
        .filter(transfer_requests::Column::Status.eq(Status::Pending))
        .filter(transfer_requests::Column::ExpiresAt.lte(now))
        .order_by_asc(transfer_requests::Column::ExpiresAt)
        .into_tuple()
        .all(db)
        .await
}

/// Resolve a pending transfer, stamping the matching timestamp.
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    transfer: transfer_requests::Model,
    status: Status,
) -> Result<transfer_requests::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: transfer_requests::ActiveModel = transfer.into();
    active.status = Set(status);

    match status {
        Status::Confirmed => active.confirmed_at = Set(Some(now)),
        Status::Rejected => active.rejected_at = Set(Some(now)),
        Status::Disputed => active.disputed_at = Set(Some(now)),
        Status::Canceled => active.canceled_at = Set(Some(now)),
        Status::Pending | Status::Expired => {}
    }

    active.update(db).await
}
