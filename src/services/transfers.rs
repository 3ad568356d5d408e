use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::placement_requests as placement_service;
use super::{finish, relationships};
use crate::auth::authorization::Actor;
use crate::db::pets as pet_db;
use crate::db::placement_requests as request_db;
use crate::db::responses as response_db;
use crate::db::transfers as transfer_db;
use crate::db::users as user_db;
use crate::error::{PlacementError, Result};
use crate::models::placement_request_responses::Status as ResponseStatus;
use crate::models::placement_requests::{self, RequestType, Status as RequestStatus};
use crate::models::transfer_requests::{self, Status};
use crate::notifications::{self, EventType, NotificationIntent, Notifier};

/// A resolved transfer and the request it moved along.
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub transfer_request: transfer_requests::Model,
    pub placement_request: placement_requests::Model,
}

/// How long a recipient has to confirm a handover before the sweep expires it.
pub const HANDOVER_WINDOW_DAYS: i64 = 7;

/// The recipient's verdict on a handover.
///
/// With `condition_confirmed` the handover is applied: ownership moves for
/// permanent placements (and the request is finalized), a foster assignment
/// starts for foster placements (and the request becomes active). Without
/// it the transfer ends as `Disputed`, the request stays in
/// `PendingTransfer`, and the owner and admins are told to sort it out.
///
/// A permanent handover also closes every other live request on the pet:
/// they were opened by the previous owner. It is refused while another
/// placement on the pet is still `Active`.
pub async fn confirm(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    transfer_id: Uuid,
    condition_confirmed: bool,
) -> Result<TransferOutcome> {
    let (request_id, pet_id) = transfer_parents(db, transfer_id).await?;

    let txn = db.begin().await?;
    let result = confirm_locked(&txn, actor, pet_id, request_id, transfer_id, condition_confirmed).await;
    let (outcome, intents) = finish(txn, result).await?;

    let transfer = &outcome.transfer_request;
    if condition_confirmed {
        tracing::info!(transfer_request_id = %transfer.id, %request_id, "handover confirmed");
    } else {
        tracing::warn!(transfer_request_id = %transfer.id, %request_id, "handover disputed");
    }

    notifications::dispatch(notifier, intents);
    Ok(outcome)
}

async fn confirm_locked<C: ConnectionTrait>(
    txn: &C,
    actor: &Actor,
    pet_id: Uuid,
    request_id: Uuid,
    transfer_id: Uuid,
    condition_confirmed: bool,
) -> Result<(TransferOutcome, Vec<NotificationIntent>)> {
    pet_db::lock_pet(txn, pet_id).await?;
    let (request, transfer) = lock_pair(txn, request_id, transfer_id).await?;

    if actor.user_id != transfer.to_user_id {
        return Err(PlacementError::Forbidden);
    }

    if transfer.status != Status::Pending {
        return Err(PlacementError::invalid_state(format!(
            "transfer is already {:?}",
            transfer.status
        )));
    }

    if request.status != RequestStatus::PendingTransfer {
        return Err(PlacementError::invalid_state(format!(
            "placement request is not awaiting a handover (status is {:?})",
            request.status
        )));
    }

    if !condition_confirmed {
        let transfer = transfer_db::transition(txn, transfer, Status::Disputed).await?;
        let payload = json!({
            "placement_request_id": request.id,
            "transfer_request_id": transfer.id,
            "needs_resolution": true,
        });

        let mut intents = vec![NotificationIntent::new(
            transfer.from_user_id,
            EventType::TransferDisputed,
            payload.clone(),
        )];
        for admin_id in user_db::get_admin_ids(txn).await? {
            intents.push(NotificationIntent::new(
                admin_id,
                EventType::TransferDisputed,
                payload.clone(),
            ));
        }

        return Ok((
            TransferOutcome {
                transfer_request: transfer,
                placement_request: request,
            },
            intents,
        ));
    }

    let mut intents = Vec::new();
    let now = Utc::now();

    if request.request_type == RequestType::PetSitting {
        return Err(PlacementError::invalid_state(
            "pet sitting placements have no handover",
        ));
    }

    if request.request_type == RequestType::Permanent {
        intents.extend(close_sibling_requests(txn, &request).await?);
    }

    let transfer = transfer_db::transition(txn, transfer, Status::Confirmed).await?;

    let next_status = if request.request_type == RequestType::Permanent {
        relationships::transfer_ownership(
            txn,
            request.pet_id,
            transfer.from_user_id,
            transfer.to_user_id,
            now,
        )
        .await?;
        RequestStatus::Finalized
    } else {
        relationships::start_foster(
            txn,
            request.pet_id,
            transfer.to_user_id,
            transfer.from_user_id,
            Some(transfer.id),
            request.start_date.unwrap_or_else(|| now.date_naive()),
            request.end_date,
        )
        .await?;
        RequestStatus::Active
    };

    let request = request_db::update_status(txn, request, next_status).await?;

    intents.push(NotificationIntent::new(
        transfer.from_user_id,
        EventType::TransferConfirmed,
        json!({ "placement_request_id": request.id, "transfer_request_id": transfer.id }),
    ));

    Ok((
        TransferOutcome {
            transfer_request: transfer,
            placement_request: request,
        },
        intents,
    ))
}

/// Cancel every other live request on the pet ahead of an ownership change.
///
/// All siblings are locked and checked before anything is written. An
/// `Active` sibling (a foster or sitting in progress) blocks the handover.
/// Open siblings are cancelled; siblings waiting on a handover have that
/// transfer canceled and the accepted response cancelled with them.
async fn close_sibling_requests<C: ConnectionTrait>(
    txn: &C,
    request: &placement_requests::Model,
) -> Result<Vec<NotificationIntent>> {
    let mut siblings = Vec::new();
    for live in request_db::get_live_requests_for_pet(txn, request.pet_id).await? {
        if live.id == request.id {
            continue;
        }
        if let Some(sibling) = request_db::lock_placement_request(txn, live.id).await? {
            siblings.push(sibling);
        }
    }

    if siblings.iter().any(|s| s.status == RequestStatus::Active) {
        return Err(PlacementError::invalid_state(
            "another placement for this pet is still active",
        ));
    }

    let mut intents = Vec::new();
    for sibling in siblings {
        match sibling.status {
            RequestStatus::Open => {
                intents.extend(placement_service::pending_helper_intents(txn, &sibling).await?);
            }
            RequestStatus::PendingTransfer => {
                if let Some(pending) = transfer_db::get_pending_transfer(txn, sibling.id).await? {
                    if let Some(response) =
                        response_db::lock_response(txn, pending.placement_request_response_id).await?
                    {
                        if response.status == ResponseStatus::Accepted {
                            response_db::transition(txn, response, ResponseStatus::Cancelled).await?;
                        }
                    }
                    if let Some(pending) = transfer_db::lock_transfer(txn, pending.id).await? {
                        let pending = transfer_db::transition(txn, pending, Status::Canceled).await?;
                        intents.push(NotificationIntent::new(
                            pending.to_user_id,
                            EventType::TransferCanceled,
                            json!({
                                "placement_request_id": sibling.id,
                                "transfer_request_id": pending.id,
                            }),
                        ));
                    }
                }
            }
            _ => continue,
        }

        let sibling = request_db::update_status(txn, sibling, RequestStatus::Cancelled).await?;
        tracing::info!(
            placement_request_id = %sibling.id,
            superseded_by = %request.id,
            "placement request closed by ownership transfer"
        );
    }

    Ok(intents)
}

/// The recipient declines the handover outright.
///
/// Unlike a dispute this is not escalated: the transfer ends as `Rejected`
/// and the request reopens exactly as on [`cancel`].
pub async fn reject(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    transfer_id: Uuid,
) -> Result<TransferOutcome> {
    let (request_id, _) = transfer_parents(db, transfer_id).await?;

    let txn = db.begin().await?;
    let result = abandon_locked(&txn, request_id, transfer_id, Status::Rejected, |t| {
        actor.user_id == t.to_user_id
    })
    .await;
    let outcome = finish(txn, result).await?;

    let transfer = &outcome.transfer_request;
    tracing::info!(transfer_request_id = %transfer.id, %request_id, "handover rejected by recipient");
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            transfer.from_user_id,
            EventType::TransferRejected,
            json!({ "placement_request_id": request_id, "transfer_request_id": transfer.id }),
        )],
    );
    Ok(outcome)
}

/// Either party calls off a pending handover.
///
/// The accepted response that spawned the transfer is cancelled (the helper
/// may respond again) and the request goes back to `Open`, where the owner
/// can accept another pending response or wait for new ones.
pub async fn cancel(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: &Actor,
    transfer_id: Uuid,
) -> Result<TransferOutcome> {
    let (request_id, _) = transfer_parents(db, transfer_id).await?;

    let txn = db.begin().await?;
    let result = abandon_locked(&txn, request_id, transfer_id, Status::Canceled, |t| {
        t.involves(actor.user_id)
    })
    .await;
    let outcome = finish(txn, result).await?;

    let transfer = &outcome.transfer_request;
    let counterparty = if actor.user_id == transfer.from_user_id {
        transfer.to_user_id
    } else {
        transfer.from_user_id
    };

    tracing::info!(transfer_request_id = %transfer.id, %request_id, actor = %actor.user_id, "handover canceled");
    notifications::dispatch(
        notifier,
        vec![NotificationIntent::new(
            counterparty,
            EventType::TransferCanceled,
            json!({ "placement_request_id": request_id, "transfer_request_id": transfer.id }),
        )],
    );
    Ok(outcome)
}

async fn abandon_locked<C, F>(
    txn: &C,
    request_id: Uuid,
    transfer_id: Uuid,
    outcome: Status,
    allowed: F,
) -> Result<TransferOutcome>
where
    C: ConnectionTrait,
    F: FnOnce(&transfer_requests::Model) -> bool,
{
    let request = request_db::lock_placement_request(txn, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;

    let peek = transfer_db::get_transfer_by_id(txn, transfer_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Transfer request"))?;
    let response = response_db::lock_response(txn, peek.placement_request_response_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Response"))?;
    let transfer = transfer_db::lock_transfer(txn, transfer_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Transfer request"))?;

    if !allowed(&transfer) {
        return Err(PlacementError::Forbidden);
    }

    if transfer.status != Status::Pending {
        return Err(PlacementError::invalid_state(format!(
            "transfer is already {:?}",
            transfer.status
        )));
    }

    let transfer = transfer_db::transition(txn, transfer, outcome).await?;

    if response.status == ResponseStatus::Accepted {
        response_db::transition(txn, response, ResponseStatus::Cancelled).await?;
    }

    let request = if request.status == RequestStatus::PendingTransfer {
        request_db::update_status(txn, request, RequestStatus::Open).await?
    } else {
        request
    };

    Ok(TransferOutcome {
        transfer_request: transfer,
        placement_request: request,
    })
}

/// Expire pending handovers whose `expires_at` is at or before `now`.
///
/// Entry point for the external scheduled sweep, next to
/// [`placement_requests::expire_overdue`](super::placement_requests::expire_overdue).
/// An expired handover is unwound like a cancelled one: the accepted
/// response is cancelled and the request reopens. A transfer resolved in
/// the meantime is skipped.
pub async fn expire_overdue(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<u64> {
    let mut expired = 0;

    for (request_id, transfer_id) in transfer_db::get_overdue_pending(db, now).await? {
        let txn = db.begin().await?;
        let result = abandon_locked(&txn, request_id, transfer_id, Status::Expired, |_| true).await;

        let outcome = match finish(txn, result).await {
            Ok(outcome) => outcome,
            Err(PlacementError::InvalidState(_)) => continue,
            Err(e) => return Err(e),
        };

        expired += 1;
        let transfer = &outcome.transfer_request;
        tracing::info!(transfer_request_id = %transfer.id, %request_id, "handover expired");

        let payload = json!({ "placement_request_id": request_id, "transfer_request_id": transfer.id });
        notifications::dispatch(
            notifier,
            vec![
                NotificationIntent::new(transfer.from_user_id, EventType::TransferExpired, payload.clone()),
                NotificationIntent::new(transfer.to_user_id, EventType::TransferExpired, payload),
            ],
        );
    }

    Ok(expired)
}

/// Assert that a transfer is fully settled: confirmed, with the parent
/// request already moved past `PendingTransfer`. Read-only and idempotent.
pub async fn complete(db: &DatabaseConnection, transfer_id: Uuid) -> Result<TransferOutcome> {
    let transfer = transfer_db::get_transfer_by_id(db, transfer_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Transfer request"))?;
    let request = request_db::get_placement_request_by_id(db, transfer.placement_request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;

    if transfer.status != Status::Confirmed {
        return Err(PlacementError::invalid_state(format!(
            "transfer is {:?}, not confirmed",
            transfer.status
        )));
    }

    if request.status == RequestStatus::PendingTransfer {
        return Err(PlacementError::invalid_state(
            "placement request is still awaiting the handover",
        ));
    }

    Ok(TransferOutcome {
        transfer_request: transfer,
        placement_request: request,
    })
}

/// The request and pet a transfer hangs off. Both links are immutable, so
/// they are read before any lock is taken.
async fn transfer_parents(db: &DatabaseConnection, transfer_id: Uuid) -> Result<(Uuid, Uuid)> {
    let transfer = transfer_db::get_transfer_by_id(db, transfer_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Transfer request"))?;
    let request = request_db::get_placement_request_by_id(db, transfer.placement_request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;

    Ok((request.id, request.pet_id))
}

async fn lock_pair<C: ConnectionTrait>(
    txn: &C,
    request_id: Uuid,
    transfer_id: Uuid,
) -> Result<(placement_requests::Model, transfer_requests::Model)> {
    let request = request_db::lock_placement_request(txn, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;
    let transfer = transfer_db::lock_transfer(txn, transfer_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Transfer request"))?;

    Ok((request, transfer))
}
