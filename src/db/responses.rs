use sea_orm::*;
use uuid::Uuid;

use crate::models::helper_profiles;
use crate::models::placement_request_responses::{self, RespondToPlacementRequest, Status};

/// Insert a new response in `Responded` status.
pub async fn insert_response<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
    input: RespondToPlacementRequest,
) -> Result<placement_request_responses::Model, DbErr> {
    let new_response = placement_request_responses::ActiveModel {
        id: Set(Uuid::new_v4()),
        placement_request_id: Set(placement_request_id),
        helper_profile_id: Set(input.helper_profile_id),
        status: Set(Status::Responded),
        message: Set(input.message),
        responded_at: Set(chrono::Utc::now()),
        accepted_at: Set(None),
        rejected_at: Set(None),
        cancelled_at: Set(None),
    };

    new_response.insert(db).await
}

/// Fetch a single response by ID.
pub async fn get_response_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<placement_request_responses::Model>, DbErr> {
    placement_request_responses::Entity::find_by_id(id).one(db).await
}

/// Fetch and row-lock a response for the rest of the transaction.
pub async fn lock_response<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<placement_request_responses::Model>, DbErr> {
    placement_request_responses::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await
}

/// All responses a helper profile has ever made on a request.
pub async fn get_responses_for_helper<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
    helper_profile_id: Uuid,
) -> Result<Vec<placement_request_responses::Model>, DbErr> {
    placement_request_responses::Entity::find()
        .filter(placement_request_responses::Column::PlacementRequestId.eq(placement_request_id))
        .filter(placement_request_responses::Column::HelperProfileId.eq(helper_profile_id))
        .all(db)
        .await
}

/// Responses on a request in a given status.
pub async fn get_responses_by_status<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
    status: Status,
) -> Result<Vec<placement_request_responses::Model>, DbErr> {
    placement_request_responses::Entity::find()
        .filter(placement_request_responses::Column::PlacementRequestId.eq(placement_request_id))
        .filter(placement_request_responses::Column::Status.eq(status))
        .all(db)
        .await
}

/// Every response on a request with the helper profile behind it, oldest first.
pub async fn get_responses_with_helpers<C: ConnectionTrait>(
    db: &C,
    placement_request_id: Uuid,
) -> Result<Vec<(placement_request_responses::Model, Option<helper_profiles::Model>)>, DbErr> {
    placement_request_responses::Entity::find()
        .filter(placement_request_responses::Column::PlacementRequestId.eq(placement_request_id))
        .find_also_related(helper_profiles::Entity)
        .order_by_asc(placement_request_responses::Column::RespondedAt)
        .all(db)
        .await
}

/// Move a response to a terminal or accepted status, stamping the matching
/// timestamp. Timestamps are written once, at the transition.
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    response: placement_request_responses::Model,
    status: Status,
) -> Result<placement_request_responses::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: placement_request_responses::ActiveModel = response.into();
    active.status = Set(status);

    match status {
        Status::Accepted => active.accepted_at = Set(Some(now)),
        Status::Rejected => active.rejected_at = Set(Some(now)),
        Status::Cancelled => active.cancelled_at = Set(Some(now)),
        Status::Responded => {}
    }

    active.update(db).await
}
