use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;
use uuid::Uuid;

use super::capability::{self, Capability};
use super::{finish, relationships};
use crate::auth::authorization::Actor;
use crate::db::pets as pet_db;
use crate::db::placement_requests as request_db;
use crate::db::relationships as relationship_db;
use crate::db::responses as response_db;
use crate::db::transfers as transfer_db;
use crate::error::{PlacementError, Result};
use crate::models::foster_assignments;
use crate::models::placement_request_responses as responses;
use crate::models::placement_requests::{self, CreatePlacementRequest, Status};
use crate::notifications::{self, EventType, NotificationIntent, Notifier};

/// Open a new placement request for a pet.
///
/// The pet row is locked for the whole check-then-insert so two concurrent
/// creates for the same pet cannot both pass the duplicate check.
pub async fn create(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CreatePlacementRequest,
) -> Result<placement_requests::Model> {
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(PlacementError::invalid_state(
                "end_date must not be before start_date",
            ));
        }
    }

    let txn = db.begin().await?;
    let result = create_locked(&txn, actor, input).await;
    let request = finish(txn, result).await?;

    tracing::info!(
        placement_request_id = %request.id,
        pet_id = %request.pet_id,
        request_type = ?request.request_type,
        "placement request created"
    );
    Ok(request)
}

async fn create_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    input: CreatePlacementRequest,
) -> Result<placement_requests::Model> {
    let pet = pet_db::lock_pet(txn, input.pet_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Pet"))?;
    let pet_type = pet_db::get_pet_type(txn, pet.pet_type_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Pet type"))?;

    let owner_id = relationships::current_owner(txn, pet.id)
        .await?
        .ok_or_else(|| PlacementError::invalid_state("pet has no current owner"))?;

    if !actor.is_admin && actor.user_id != owner_id {
        return Err(PlacementError::Forbidden);
    }

    if !capability::supports(&pet_type, Capability::Placement) {
        return Err(PlacementError::CapabilityDenied);
    }

    if request_db::live_request_exists(txn, pet.id, input.request_type).await? {
        return Err(PlacementError::DuplicateActiveRequest);
    }

    if relationships::has_active_foster(txn, pet.id).await? {
        return Err(PlacementError::ActiveFosterConflict);
    }

    request_db::insert_placement_request(txn, input, owner_id)
        .await
        .map_err(|e| PlacementError::from_write(e, PlacementError::DuplicateActiveRequest))
}

/// Close out an active temporary placement once the pet is back with its owner.
pub async fn finalize(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    request_id: Uuid,
) -> Result<placement_requests::Model> {
    let pet_id = request_db::get_placement_request_by_id(db, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?
        .pet_id;

    let txn = db.begin().await?;
    let result = finalize_locked(&txn, actor, pet_id, request_id).await;
    let (request, intents) = finish(txn, result).await?;

    tracing::info!(placement_request_id = %request.id, "placement request finalized");
    notifications::dispatch(notifier, intents);
    Ok(request)
}

async fn finalize_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    pet_id: Uuid,
    request_id: Uuid,
) -> Result<(placement_requests::Model, Vec<NotificationIntent>)> {
    pet_db::lock_pet(txn, pet_id).await?;
    let request = request_db::lock_placement_request(txn, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;

    if !actor.can_manage(&request) {
        return Err(PlacementError::Forbidden);
    }

    if request.status != Status::Active {
        return Err(PlacementError::invalid_state(format!(
            "only active placement requests can be finalized (status is {:?})",
            request.status
        )));
    }

    if !request.request_type.is_temporary() {
        return Err(PlacementError::UnsupportedType);
    }

    if request.request_type.is_foster() {
        if let Some(assignment) = own_foster_assignment(txn, &request).await? {
            relationships::end_foster(txn, request.pet_id, assignment.foster_user_id, Utc::now())
                .await?;
        }
    }

    let request = request_db::update_status(txn, request, Status::Finalized).await?;

    let mut intents = Vec::new();
    if let Some(helper_user_id) = accepted_helper_user(txn, request.id).await? {
        intents.push(NotificationIntent::new(
            helper_user_id,
            EventType::PlacementFinalized,
            json!({ "placement_request_id": request.id, "pet_id": request.pet_id }),
        ));
    }

    Ok((request, intents))
}

/// The active foster assignment that came out of this request's own handover.
/// Another request's foster on the same pet is left alone.
async fn own_foster_assignment<C: ConnectionTrait>(
    txn: &C,
    request: &placement_requests::Model,
) -> Result<Option<foster_assignments::Model>> {
    let Some(assignment) = relationship_db::get_active_assignment(txn, request.pet_id).await? else {
        return Ok(None);
    };
    let Some(transfer_id) = assignment.transfer_request_id else {
        return Ok(None);
    };

    let owned = transfer_db::get_transfer_by_id(txn, transfer_id)
        .await?
        .is_some_and(|t| t.placement_request_id == request.id);
    Ok(owned.then_some(assignment))
}

/// Withdraw an open request (owner or admin).
pub async fn cancel(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    request_id: Uuid,
) -> Result<placement_requests::Model> {
    let txn = db.begin().await?;
    let result = cancel_locked(&txn, actor, request_id).await;
    let (request, intents) = finish(txn, result).await?;

    tracing::info!(placement_request_id = %request.id, actor = %actor.user_id, "placement request cancelled");
    notifications::dispatch(notifier, intents);
    Ok(request)
}

async fn cancel_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    request_id: Uuid,
) -> Result<(placement_requests::Model, Vec<NotificationIntent>)> {
    let request = close_open_request(txn, request_id, |request| actor.can_manage(request)).await?;
    let intents = pending_helper_intents(txn, &request).await?;
    Ok((request, intents))
}

/// `placement_cancelled` intents for every helper still waiting on a request.
pub(crate) async fn pending_helper_intents<C: ConnectionTrait>(
    conn: &C,
    request: &placement_requests::Model,
) -> Result<Vec<NotificationIntent>> {
    let pending =
        response_db::get_responses_by_status(conn, request.id, responses::Status::Responded)
            .await?;

    let mut intents = Vec::with_capacity(pending.len());
    for response in pending {
        if let Some(profile) = pet_db::get_helper_profile(conn, response.helper_profile_id).await? {
            intents.push(NotificationIntent::new(
                profile.user_id,
                EventType::PlacementCancelled,
                json!({ "placement_request_id": request.id, "response_id": response.id }),
            ));
        }
    }

    Ok(intents)
}

/// Take an open request down as a moderation action (admin only).
pub async fn reject(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    request_id: Uuid,
) -> Result<placement_requests::Model> {
    let txn = db.begin().await?;
    let result = close_open_request(&txn, request_id, |_| actor.is_admin).await;
    let request = finish(txn, result).await?;

    tracing::info!(placement_request_id = %request.id, admin = %actor.user_id, "placement request rejected");
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            request.owner_user_id,
            EventType::PlacementRejectedByAdmin,
            json!({ "placement_request_id": request.id }),
        )],
    );
    Ok(request)
}

async fn close_open_request<C, F>(
    txn: &C,
    request_id: Uuid,
    allowed: F,
) -> Result<placement_requests::Model>
where
    C: ConnectionTrait,
    F: FnOnce(&placement_requests::Model) -> bool,
{
    let request = request_db::lock_placement_request(txn, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;

    if !allowed(&request) {
        return Err(PlacementError::Forbidden);
    }

    if request.status != Status::Open {
        return Err(PlacementError::invalid_state(format!(
            "only open placement requests can be closed (status is {:?})",
            request.status
        )));
    }

    Ok(request_db::update_status(txn, request, Status::Cancelled).await?)
}

/// Expire open requests whose `expires_at` is at or before `now`.
///
/// Entry point for the external scheduled sweep. Each request is re-checked
/// under its own row lock, so a request accepted in the meantime is skipped.
pub async fn expire_overdue(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<u64> {
    let mut expired = 0;

    for request_id in request_db::get_overdue_open_ids(db, now).await? {
        let txn = db.begin().await?;
        let result = expire_locked(&txn, request_id, now).await;

        if let Some(request) = finish(txn, result).await? {
            expired += 1;
            tracing::info!(placement_request_id = %request.id, "placement request expired");
            notifications::dispatch(
                notifier,
                vec![NotificationIntent::new(
                    request.owner_user_id,
                    EventType::PlacementExpired,
                    json!({ "placement_request_id": request.id }),
                )],
            );
        }
    }

    Ok(expired)
}

async fn expire_locked<C: ConnectionTrait>(
    txn: &C,
    request_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<placement_requests::Model>> {
    let Some(request) = request_db::lock_placement_request(txn, request_id).await? else {
        return Ok(None);
    };

    let overdue = request.expires_at.is_some_and(|at| at <= now);
    if request.status != Status::Open || !overdue {
        return Ok(None);
    }

    Ok(Some(
        request_db::update_status(txn, request, Status::Expired).await?,
    ))
}

/// The user behind the accepted response on a request, if there is one.
pub(crate) async fn accepted_helper_user<C: ConnectionTrait>(
    conn: &C,
    request_id: Uuid,
) -> Result<Option<Uuid>> {
    let accepted =
        response_db::get_responses_by_status(conn, request_id, responses::Status::Accepted).await?;

    match accepted.first() {
        Some(response) => Ok(pet_db::get_helper_profile(conn, response.helper_profile_id)
            .await?
            .map(|profile| profile.user_id)),
        None => Ok(None),
    }
}
