use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{finish, relationships, transfers};
use crate::auth::authorization::Actor;
use crate::db::pets as pet_db;
use crate::db::placement_requests as request_db;
use crate::db::responses as response_db;
use crate::db::transfers as transfer_db;
use crate::error::{PlacementError, Result};
use crate::models::placement_request_responses::{self, RespondToPlacementRequest, Status};
use crate::models::placement_requests::{self, Status as RequestStatus};
use crate::models::transfer_requests;
use crate::notifications::{self, EventType, NotificationIntent, Notifier};

/// Everything an accept touches, returned to the caller in one piece.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedResponse {
    pub response: placement_request_responses::Model,
    pub placement_request: placement_requests::Model,
    pub transfer_request: Option<transfer_requests::Model>,
}

/// Record a helper's interest in an open placement request.
///
/// The request row is locked while the helper's previous responses are
/// inspected, so a helper cannot slip a second live response in through a
/// concurrent call.
pub async fn respond(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    request_id: Uuid,
    input: RespondToPlacementRequest,
) -> Result<placement_request_responses::Model> {
    let txn = db.begin().await?;
    let result = respond_locked(&txn, actor, request_id, input).await;
    let (response, owner_id) = finish(txn, result).await?;

    tracing::info!(
        response_id = %response.id,
        placement_request_id = %request_id,
        helper_profile_id = %response.helper_profile_id,
        "response created"
    );
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            owner_id,
            EventType::ResponseReceived,
            json!({
                "placement_request_id": request_id,
                "response_id": response.id,
                "helper_profile_id": response.helper_profile_id,
            }),
        )],
    );
    Ok(response)
}

async fn respond_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    request_id: Uuid,
    input: RespondToPlacementRequest,
) -> Result<(placement_request_responses::Model, Uuid)> {
    let request = request_db::lock_placement_request(txn, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;
    let profile = pet_db::get_helper_profile(txn, input.helper_profile_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Helper profile"))?;

    if !actor.owns_helper_profile(&profile) {
        return Err(PlacementError::Forbidden);
    }

    if request.status != RequestStatus::Open {
        return Err(PlacementError::RequestNotActive);
    }

    if profile.user_id == request.owner_user_id {
        return Err(PlacementError::SelfResponseForbidden);
    }

    let previous = response_db::get_responses_for_helper(txn, request.id, profile.id).await?;
    if previous.iter().any(|r| r.status == Status::Rejected) {
        return Err(PlacementError::HelperBlocked);
    }
    if previous.iter().any(|r| r.status.is_live()) {
        return Err(PlacementError::AlreadyResponded);
    }

    let response = response_db::insert_response(txn, request.id, input)
        .await
        .map_err(|e| PlacementError::from_write(e, PlacementError::AlreadyResponded))?;

    Ok((response, request.owner_user_id))
}

/// Accept a pending response (owner or admin).
///
/// Handover types get exactly one pending transfer and the request moves to
/// `PendingTransfer`; pet sitting has no handover and goes straight to
/// `Active`.
pub async fn accept(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    response_id: Uuid,
) -> Result<AcceptedResponse> {
    let request_id = response_request_id(db, response_id).await?;

    let txn = db.begin().await?;
    let result = accept_locked(&txn, actor, request_id, response_id).await;
    let (accepted, helper_user_id) = finish(txn, result).await?;

    tracing::info!(
        response_id = %accepted.response.id,
        placement_request_id = %accepted.placement_request.id,
        status = ?accepted.placement_request.status,
        "response accepted"
    );
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            helper_user_id,
            EventType::ResponseAccepted,
            json!({
                "placement_request_id": accepted.placement_request.id,
                "response_id": accepted.response.id,
                "transfer_request_id": accepted.transfer_request.as_ref().map(|t| t.id),
            }),
        )],
    );
    Ok(accepted)
}

async fn accept_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    request_id: Uuid,
    response_id: Uuid,
) -> Result<(AcceptedResponse, Uuid)> {
    let (request, response) = lock_pair(txn, request_id, response_id).await?;

    if !actor.can_manage(&request) {
        return Err(PlacementError::Forbidden);
    }

    if response.status != Status::Responded {
        return Err(PlacementError::invalid_state(format!(
            "only pending responses can be accepted (status is {:?})",
            response.status
        )));
    }

    if request.status != RequestStatus::Open {
        return Err(PlacementError::invalid_state(format!(
            "placement request is no longer open (status is {:?})",
            request.status
        )));
    }

    let helper = pet_db::get_helper_profile(txn, response.helper_profile_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Helper profile"))?;

    let current_owner = relationships::current_owner(txn, request.pet_id).await?;
    if current_owner != Some(request.owner_user_id) {
        return Err(PlacementError::invalid_state(
            "pet has changed owner since this request was opened",
        ));
    }

    let response = response_db::transition(txn, response, Status::Accepted).await?;

    let (placement_request, transfer_request) = if request.request_type.requires_handover() {
        let expires_at = Utc::now() + Duration::days(transfers::HANDOVER_WINDOW_DAYS);
        let transfer = transfer_db::insert_transfer(
            txn,
            request.id,
            response.id,
            request.owner_user_id,
            helper.user_id,
            Some(expires_at),
        )
        .await
        .map_err(|e| {
            PlacementError::from_write(
                e,
                PlacementError::invalid_state("response already has a transfer"),
            )
        })?;
        let request = request_db::update_status(txn, request, RequestStatus::PendingTransfer).await?;
        (request, Some(transfer))
    } else {
        let request = request_db::update_status(txn, request, RequestStatus::Active).await?;
        (request, None)
    };

    Ok((
        AcceptedResponse {
            response,
            placement_request,
            transfer_request,
        },
        helper.user_id,
    ))
}

/// Reject a pending response (owner or admin). The helper profile can never
/// respond to this request again.
pub async fn reject(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    response_id: Uuid,
) -> Result<placement_request_responses::Model> {
    let request_id = response_request_id(db, response_id).await?;

    let txn = db.begin().await?;
    let result = reject_locked(&txn, actor, request_id, response_id).await;
    let (response, helper_user_id) = finish(txn, result).await?;

    tracing::info!(response_id = %response.id, placement_request_id = %request_id, "response rejected");
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            helper_user_id,
            EventType::ResponseRejected,
            json!({ "placement_request_id": request_id, "response_id": response.id }),
        )],
    );
    Ok(response)
}

async fn reject_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    request_id: Uuid,
    response_id: Uuid,
) -> Result<(placement_request_responses::Model, Uuid)> {
    let (request, response) = lock_pair(txn, request_id, response_id).await?;

    if !actor.can_manage(&request) {
        return Err(PlacementError::Forbidden);
    }

    if response.status != Status::Responded {
        return Err(PlacementError::invalid_state(format!(
            "only pending responses can be rejected (status is {:?})",
            response.status
        )));
    }

    let helper = pet_db::get_helper_profile(txn, response.helper_profile_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Helper profile"))?;
    let response = response_db::transition(txn, response, Status::Rejected).await?;

    Ok((response, helper.user_id))
}

/// Withdraw a pending response (the helper who made it). The helper may
/// respond again later.
pub async fn cancel(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    response_id: Uuid,
) -> Result<placement_request_responses::Model> {
    let request_id = response_request_id(db, response_id).await?;

    let txn = db.begin().await?;
    let result = cancel_locked(&txn, actor, request_id, response_id).await;
    let (response, owner_id) = finish(txn, result).await?;

    tracing::info!(response_id = %response.id, placement_request_id = %request_id, "response cancelled");
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            owner_id,
            EventType::ResponseCancelled,
            json!({ "placement_request_id": request_id, "response_id": response.id }),
        )],
    );
    Ok(response)
}

async fn cancel_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    request_id: Uuid,
    response_id: Uuid,
) -> Result<(placement_request_responses::Model, Uuid)> {
    let (request, response) = lock_pair(txn, request_id, response_id).await?;

    let profile = pet_db::get_helper_profile(txn, response.helper_profile_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Helper profile"))?;

    if !actor.owns_helper_profile(&profile) {
        return Err(PlacementError::Forbidden);
    }

    if response.status != Status::Responded {
        return Err(PlacementError::invalid_state(format!(
            "only pending responses can be cancelled (status is {:?})",
            response.status
        )));
    }

    let response = response_db::transition(txn, response, Status::Cancelled).await?;
    Ok((response, request.owner_user_id))
}

/// The request a response belongs to. `placement_request_id` never changes,
/// so reading it before taking locks is safe.
async fn response_request_id(db: &DatabaseConnection, response_id: Uuid) -> Result<Uuid> {
    response_db::get_response_by_id(db, response_id)
        .await?
        .map(|r| r.placement_request_id)
        .ok_or_else(|| PlacementError::not_found("Response"))
}

/// Lock the parent request, then the response.
async fn lock_pair<C: ConnectionTrait>(
    txn: &C,
    request_id: Uuid,
    response_id: Uuid,
) -> Result<(placement_requests::Model, placement_request_responses::Model)> {
    let request = request_db::lock_placement_request(txn, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;
    let response = response_db::lock_response(txn, response_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Response"))?;

    Ok((request, response))
}
