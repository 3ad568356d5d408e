//! Who is looking at a placement request, and what they can do right now.
//!
//! Nothing here is stored. [`resolve`] is a pure function of the actor and a
//! [`PlacementSnapshot`], and every flag in [`AvailableActions`] mirrors the
//! precondition of the operation it advertises.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use super::relationships;
use crate::auth::authorization::{Actor, Role};
use crate::db::chats as chat_db;
use crate::db::pets as pet_db;
use crate::db::placement_requests as request_db;
use crate::db::responses as response_db;
use crate::db::transfers as transfer_db;
use crate::error::{PlacementError, Result};
use crate::models::placement_request_responses::{self, Status as ResponseStatus};
use crate::models::placement_requests::{self, Status as RequestStatus};
use crate::models::transfer_requests::{self, Status as TransferStatus};

/// A response together with the user behind its helper profile.
#[derive(Debug, Clone, Serialize)]
pub struct HelperResponse {
    #[serde(flatten)]
    pub response: placement_request_responses::Model,
    pub helper_user_id: Uuid,
}

/// A placement request with everything the resolver needs, loaded eagerly.
#[derive(Debug, Clone)]
pub struct PlacementSnapshot {
    pub request: placement_requests::Model,
    /// Holder of the pet's open owner edge; falls back to the request owner.
    pub current_owner_id: Uuid,
    pub responses: Vec<HelperResponse>,
    pub transfers: Vec<transfer_requests::Model>,
    /// Helper profiles owned by the viewer; empty for anonymous viewers.
    pub viewer_profile_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailableActions {
    pub can_respond: bool,
    pub can_cancel_my_response: bool,
    pub can_accept_responses: bool,
    pub can_reject_responses: bool,
    pub can_confirm_handover: bool,
    pub can_cancel_transfer: bool,
    pub can_finalize: bool,
    pub can_delete_request: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerContext {
    pub viewer_role: Role,
    pub my_response: Option<HelperResponse>,
    pub my_transfer: Option<transfer_requests::Model>,
    pub available_actions: AvailableActions,
    pub chat_id: Option<Uuid>,
}

/// Role resolution: admin, then owner, then helper (responded or party to a
/// transfer), then public.
pub fn resolve_role(actor: Option<&Actor>, snapshot: &PlacementSnapshot) -> Role {
    let Some(actor) = actor else {
        return Role::Public;
    };

    if actor.is_admin {
        Role::Admin
    } else if actor.user_id == snapshot.current_owner_id {
        Role::Owner
    } else if snapshot
        .responses
        .iter()
        .any(|r| r.helper_user_id == actor.user_id)
        || snapshot.transfers.iter().any(|t| t.involves(actor.user_id))
    {
        Role::Helper
    } else {
        Role::Public
    }
}

/// Compute the viewer context without touching the database. `chat_id` is
/// left empty; [`load_viewer_context`] fills it in.
pub fn resolve(actor: Option<&Actor>, snapshot: &PlacementSnapshot) -> ViewerContext {
    let viewer_role = resolve_role(actor, snapshot);
    let request = &snapshot.request;

    let Some(actor) = actor else {
        return ViewerContext {
            viewer_role,
            my_response: None,
            my_transfer: None,
            available_actions: AvailableActions::default(),
            chat_id: None,
        };
    };

    let mine: Vec<&HelperResponse> = snapshot
        .responses
        .iter()
        .filter(|r| r.helper_user_id == actor.user_id)
        .collect();

    // Prefer the live response; otherwise the most recent one.
    let my_response = mine
        .iter()
        .find(|r| r.response.status.is_live())
        .or_else(|| mine.iter().max_by_key(|r| r.response.responded_at))
        .map(|r| (*r).clone());

    let my_transfer = my_response
        .as_ref()
        .and_then(|mr| {
            snapshot
                .transfers
                .iter()
                .find(|t| t.placement_request_response_id == mr.response.id)
        })
        .or_else(|| {
            snapshot
                .transfers
                .iter()
                .filter(|t| t.involves(actor.user_id))
                .max_by_key(|t| t.created_at)
        })
        .cloned();

    let manages = actor.can_manage(request);
    let any_pending = snapshot
        .responses
        .iter()
        .any(|r| r.response.status == ResponseStatus::Responded);
    // Respond runs per profile, so one profile that is neither blocked nor
    // already live is enough.
    let free_profile = snapshot.viewer_profile_ids.iter().any(|profile_id| {
        !snapshot.responses.iter().any(|r| {
            r.response.helper_profile_id == *profile_id
                && (r.response.status == ResponseStatus::Rejected || r.response.status.is_live())
        })
    });
    let pending_transfer = my_transfer
        .as_ref()
        .filter(|t| t.status == TransferStatus::Pending);

    let available_actions = AvailableActions {
        can_respond: request.status == RequestStatus::Open
            && actor.user_id != request.owner_user_id
            && free_profile,
        can_cancel_my_response: my_response
            .as_ref()
            .is_some_and(|r| r.response.status == ResponseStatus::Responded),
        can_accept_responses: manages && request.status == RequestStatus::Open && any_pending,
        can_reject_responses: manages && any_pending,
        can_confirm_handover: request.status == RequestStatus::PendingTransfer
            && pending_transfer.is_some_and(|t| t.to_user_id == actor.user_id),
        can_cancel_transfer: pending_transfer.is_some_and(|t| t.involves(actor.user_id)),
        can_finalize: manages
            && request.status == RequestStatus::Active
            && request.request_type.is_temporary(),
        can_delete_request: manages && request.status == RequestStatus::Open,
    };

    ViewerContext {
        viewer_role,
        my_response,
        my_transfer,
        available_actions,
        chat_id: None,
    }
}

/// Load a snapshot of a placement request with its responses and transfers,
/// plus the viewer's helper profiles.
pub async fn load_snapshot(
    db: &DatabaseConnection,
    actor: Option<&Actor>,
    request_id: Uuid,
) -> Result<PlacementSnapshot> {
    let request = request_db::get_placement_request_by_id(db, request_id)
        .await?
        .ok_or_else(|| PlacementError::not_found("Placement request"))?;

    let current_owner_id = relationships::current_owner(db, request.pet_id)
        .await?
        .unwrap_or(request.owner_user_id);

    let responses = response_db::get_responses_with_helpers(db, request.id)
        .await?
        .into_iter()
        .filter_map(|(response, profile)| {
            profile.map(|p| HelperResponse {
                response,
                helper_user_id: p.user_id,
            })
        })
        .collect();

    let transfers = transfer_db::get_transfers_by_request(db, request.id).await?;

    let viewer_profile_ids = match actor {
        Some(actor) => pet_db::get_helper_profile_ids_for_user(db, actor.user_id).await?,
        None => Vec::new(),
    };

    Ok(PlacementSnapshot {
        request,
        current_owner_id,
        responses,
        transfers,
        viewer_profile_ids,
    })
}

/// Load, resolve, and look up the request-scoped chat between the owner and
/// the viewer's counterparty.
pub async fn load_viewer_context(
    db: &DatabaseConnection,
    actor: Option<&Actor>,
    request_id: Uuid,
) -> Result<(PlacementSnapshot, ViewerContext)> {
    let snapshot = load_snapshot(db, actor, request_id).await?;
    let mut context = resolve(actor, &snapshot);

    let owner_id = snapshot.request.owner_user_id;
    let helper_id = match (actor, context.viewer_role) {
        (Some(actor), Role::Helper) => Some(actor.user_id),
        (Some(_), Role::Owner | Role::Admin) => context.my_transfer.as_ref().map(|t| t.to_user_id),
        _ => None,
    };

    if let Some(helper_id) = helper_id {
        context.chat_id = chat_db::find_request_chat(db, snapshot.request.id, owner_id, helper_id).await?;
    }

    Ok((snapshot, context))
}
