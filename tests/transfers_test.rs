//! Handover confirmation, disputes, cancellation, and the end-to-end foster
//! and permanent placement flows.

mod common;

use chrono::{Duration, Utc};

use common::{World, create_user, request_input};
use placement_backend::PlacementError;
use placement_backend::auth::authorization::Actor;
use placement_backend::db::placement_requests as request_db;
use placement_backend::db::relationships as relationship_db;
use placement_backend::db::responses as response_db;
use placement_backend::db::transfers as transfer_db;
use placement_backend::models::foster_assignments;
use placement_backend::models::pet_relationships::RelationshipType;
use placement_backend::models::placement_request_responses::Status as ResponseStatus;
use placement_backend::models::placement_requests::{RequestType, Status as RequestStatus};
use placement_backend::models::transfer_requests::Status;
use placement_backend::models::users::Roles;
use placement_backend::notifications::EventType;
use placement_backend::services::{
    placement_requests as request_service, relationships, responses as response_service,
    transfers as service,
};

#[tokio::test]
async fn test_foster_placement_end_to_end() {
    let world = World::new().await;
    let today = Utc::now().date_naive();
    let mut input = request_input(world.pet.id, RequestType::FosterFree);
    input.start_date = Some(today);
    input.end_date = Some(today + Duration::days(14));
    let request = request_service::create(&world.db, &world.owner_actor(), input)
        .await
        .unwrap();

    let foster = world.helper().await;
    let other = world.helper().await;
    let response = world.respond(&foster, request.id).await;
    let other_response = world.respond(&other, request.id).await;

    let transfer = world
        .accept(response.id)
        .await
        .transfer_request
        .expect("foster placements hand over");

    let outcome = service::confirm(&world.db, &world.notifier, &foster.actor(), transfer.id, true)
        .await
        .unwrap();

    assert_eq!(outcome.transfer_request.status, Status::Confirmed);
    assert!(outcome.transfer_request.confirmed_at.is_some());
    assert_eq!(outcome.placement_request.status, RequestStatus::Active);
    assert_eq!(
        world.notifier.sent_to(world.owner.id, EventType::TransferConfirmed),
        1
    );

    // Fostering never moves ownership.
    let owner = relationships::current_owner(&world.db, world.pet.id)
        .await
        .unwrap();
    assert_eq!(owner, Some(world.owner.id));

    let assignment = relationship_db::get_active_assignment(&world.db, world.pet.id)
        .await
        .unwrap()
        .expect("foster assignment started");
    assert_eq!(assignment.foster_user_id, foster.user.id);
    assert_eq!(assignment.owner_user_id, world.owner.id);
    assert_eq!(assignment.transfer_request_id, Some(transfer.id));
    assert_eq!(assignment.start_date, today);
    assert_eq!(assignment.expected_end_date, Some(today + Duration::days(14)));

    let foster_edges =
        relationship_db::get_open_edges(&world.db, world.pet.id, RelationshipType::Foster)
            .await
            .unwrap();
    assert_eq!(foster_edges.len(), 1);
    assert_eq!(foster_edges[0].user_id, foster.user.id);

    // The other helper's response stays pending but cannot be accepted.
    let err = response_service::accept(
        &world.db,
        &world.notifier,
        &world.owner_actor(),
        other_response.id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));

    let finalized =
        request_service::finalize(&world.db, &world.notifier, &world.owner_actor(), request.id)
            .await
            .unwrap();
    assert_eq!(finalized.status, RequestStatus::Finalized);

    assert!(
        relationship_db::get_active_assignment(&world.db, world.pet.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        relationship_db::get_open_edges(&world.db, world.pet.id, RelationshipType::Foster)
            .await
            .unwrap()
            .is_empty()
    );

    let completed = foster_assignments_for(&world, assignment.id).await;
    assert_eq!(completed.status, foster_assignments::Status::Completed);
    assert!(completed.actual_end_date.is_some());

    // The pet is free for a new foster request.
    let next = world.open_request(RequestType::FosterFree).await;
    assert_eq!(next.status, RequestStatus::Open);
}

async fn foster_assignments_for(world: &World, id: uuid::Uuid) -> foster_assignments::Model {
    use sea_orm::EntityTrait;

    foster_assignments::Entity::find_by_id(id)
        .one(&world.db)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_permanent_confirm_moves_ownership() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let adopter = world.helper().await;
    let response = world.respond(&adopter, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let outcome = service::confirm(&world.db, &world.notifier, &adopter.actor(), transfer.id, true)
        .await
        .unwrap();

    assert_eq!(outcome.placement_request.status, RequestStatus::Finalized);

    let owners = relationship_db::get_open_edges(&world.db, world.pet.id, RelationshipType::Owner)
        .await
        .unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].user_id, adopter.user.id);
    assert!(
        relationship_db::get_active_assignment(&world.db, world.pet.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_new_owner_can_place_pet_again() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let adopter = world.helper().await;
    let response = world.respond(&adopter, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();
    service::confirm(&world.db, &world.notifier, &adopter.actor(), transfer.id, true)
        .await
        .unwrap();

    let err = request_service::create(
        &world.db,
        &world.owner_actor(),
        request_input(world.pet.id, RequestType::Permanent),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PlacementError::Forbidden));

    let relisted = request_service::create(
        &world.db,
        &adopter.actor(),
        request_input(world.pet.id, RequestType::Permanent),
    )
    .await
    .unwrap();
    assert_eq!(relisted.owner_user_id, adopter.user.id);
}

#[tokio::test]
async fn test_confirm_by_sender_is_forbidden() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let err = service::confirm(&world.db, &world.notifier, &world.owner_actor(), transfer.id, true)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::Forbidden));
}

#[tokio::test]
async fn test_confirm_twice_is_invalid() {
    let world = World::new().await;
    let request = world.open_request(RequestType::FosterPaid).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();
    service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, true)
        .await
        .unwrap();

    let err = service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, true)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_dispute_escalates_to_owner_and_admins() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let outcome = service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, false)
        .await
        .unwrap();

    assert_eq!(outcome.transfer_request.status, Status::Disputed);
    assert!(outcome.transfer_request.disputed_at.is_some());
    assert!(outcome.transfer_request.confirmed_at.is_none());
    assert_eq!(outcome.placement_request.status, RequestStatus::PendingTransfer);
    assert_eq!(
        world.notifier.sent_to(world.owner.id, EventType::TransferDisputed),
        1
    );
    assert_eq!(
        world.notifier.sent_to(world.admin.id, EventType::TransferDisputed),
        1
    );

    let owner = relationships::current_owner(&world.db, world.pet.id)
        .await
        .unwrap();
    assert_eq!(owner, Some(world.owner.id));

    let err = service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_cancel_reopens_request() {
    let world = World::new().await;
    let request = world.open_request(RequestType::FosterFree).await;
    let first = world.helper().await;
    let second = world.helper().await;
    let first_response = world.respond(&first, request.id).await;
    let second_response = world.respond(&second, request.id).await;
    let transfer = world.accept(first_response.id).await.transfer_request.unwrap();

    let outcome = service::cancel(&world.db, &world.notifier, &world.owner_actor(), transfer.id)
        .await
        .unwrap();

    assert_eq!(outcome.transfer_request.status, Status::Canceled);
    assert!(outcome.transfer_request.canceled_at.is_some());
    assert_eq!(outcome.placement_request.status, RequestStatus::Open);
    assert_eq!(
        world.notifier.sent_to(first.user.id, EventType::TransferCanceled),
        1
    );

    let spawning = response_db::get_response_by_id(&world.db, first_response.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(spawning.status, ResponseStatus::Cancelled);
    assert!(spawning.cancelled_at.is_some());

    // The other pending response is still acceptable.
    let accepted = world.accept(second_response.id).await;
    assert_eq!(
        accepted.placement_request.status,
        RequestStatus::PendingTransfer
    );
}

#[tokio::test]
async fn test_helper_can_respond_again_after_cancelled_handover() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    service::cancel(&world.db, &world.notifier, &helper.actor(), transfer.id)
        .await
        .unwrap();
    assert_eq!(
        world.notifier.sent_to(world.owner.id, EventType::TransferCanceled),
        1
    );

    let again = world.respond(&helper, request.id).await;
    assert_eq!(again.status, ResponseStatus::Responded);
}

#[tokio::test]
async fn test_cancel_by_stranger_is_forbidden() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();
    let stranger = create_user(&world.db, Roles::User).await;

    let err = service::cancel(&world.db, &world.notifier, &Actor::user(stranger.id), transfer.id)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::Forbidden));
}

#[tokio::test]
async fn test_recipient_reject_reopens_request() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let err = service::reject(&world.db, &world.notifier, &world.owner_actor(), transfer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::Forbidden));

    let outcome = service::reject(&world.db, &world.notifier, &helper.actor(), transfer.id)
        .await
        .unwrap();
    assert_eq!(outcome.transfer_request.status, Status::Rejected);
    assert!(outcome.transfer_request.rejected_at.is_some());
    assert_eq!(outcome.placement_request.status, RequestStatus::Open);
    assert_eq!(
        world.notifier.sent_to(world.owner.id, EventType::TransferRejected),
        1
    );

    let err = service::cancel(&world.db, &world.notifier, &helper.actor(), transfer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_complete_requires_confirmed_transfer() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let err = service::complete(&world.db, transfer.id).await.unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));

    service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, true)
        .await
        .unwrap();

    for _ in 0..2 {
        let outcome = service::complete(&world.db, transfer.id).await.unwrap();
        assert_eq!(outcome.transfer_request.status, Status::Confirmed);
        assert_eq!(outcome.placement_request.status, RequestStatus::Finalized);
    }
}

#[tokio::test]
async fn test_confirm_after_request_cancelled_is_invalid() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let stored = request_db::get_placement_request_by_id(&world.db, request.id)
        .await
        .unwrap()
        .unwrap();
    request_db::update_status(&world.db, stored, RequestStatus::Cancelled)
        .await
        .unwrap();

    let err = service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, true)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_finalizing_pet_sitting_leaves_other_foster_running() {
    let world = World::new().await;
    let sitting = world.open_request(RequestType::PetSitting).await;
    let foster_request = world.open_request(RequestType::FosterFree).await;

    let foster = world.helper().await;
    let response = world.respond(&foster, foster_request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();
    service::confirm(&world.db, &world.notifier, &foster.actor(), transfer.id, true)
        .await
        .unwrap();

    let sitter = world.helper().await;
    let sitter_response = world.respond(&sitter, sitting.id).await;
    world.accept(sitter_response.id).await;

    let finalized =
        request_service::finalize(&world.db, &world.notifier, &world.owner_actor(), sitting.id)
            .await
            .unwrap();
    assert_eq!(finalized.status, RequestStatus::Finalized);

    let assignment = relationship_db::get_active_assignment(&world.db, world.pet.id)
        .await
        .unwrap()
        .expect("foster keeps running");
    assert_eq!(assignment.foster_user_id, foster.user.id);
    assert_eq!(assignment.transfer_request_id, Some(transfer.id));

    let foster_edges =
        relationship_db::get_open_edges(&world.db, world.pet.id, RelationshipType::Foster)
            .await
            .unwrap();
    assert_eq!(foster_edges.len(), 1);

    request_service::finalize(&world.db, &world.notifier, &world.owner_actor(), foster_request.id)
        .await
        .unwrap();
    let completed = foster_assignments_for(&world, assignment.id).await;
    assert_eq!(completed.status, foster_assignments::Status::Completed);
}

#[tokio::test]
async fn test_permanent_handover_closes_previous_owners_requests() {
    let world = World::new().await;
    let permanent = world.open_request(RequestType::Permanent).await;
    let foster_free = world.open_request(RequestType::FosterFree).await;
    let foster_paid = world.open_request(RequestType::FosterPaid).await;

    // foster_free is waiting on its own handover.
    let foster = world.helper().await;
    let foster_response = world.respond(&foster, foster_free.id).await;
    let foster_transfer = world.accept(foster_response.id).await.transfer_request.unwrap();

    // foster_paid is still open with a pending response.
    let paid_helper = world.helper().await;
    let paid_response = world.respond(&paid_helper, foster_paid.id).await;

    let adopter = world.helper().await;
    let response = world.respond(&adopter, permanent.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();
    world.notifier.clear();

    service::confirm(&world.db, &world.notifier, &adopter.actor(), transfer.id, true)
        .await
        .unwrap();

    for id in [foster_free.id, foster_paid.id] {
        let stored = request_db::get_placement_request_by_id(&world.db, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Cancelled);
    }

    let stale_transfer = transfer_db::get_transfer_by_id(&world.db, foster_transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stale_transfer.status, Status::Canceled);
    let stale_response = response_db::get_response_by_id(&world.db, foster_response.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stale_response.status, ResponseStatus::Cancelled);

    assert_eq!(world.notifier.sent_to(foster.user.id, EventType::TransferCanceled), 1);
    assert_eq!(
        world.notifier.sent_to(paid_helper.user.id, EventType::PlacementCancelled),
        1
    );

    // Nothing the previous owner opened is actionable any more.
    let err = response_service::accept(
        &world.db,
        &world.notifier,
        &world.owner_actor(),
        paid_response.id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));

    let err = service::confirm(&world.db, &world.notifier, &foster.actor(), foster_transfer.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));
    assert!(
        relationship_db::get_active_assignment(&world.db, world.pet.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_permanent_handover_waits_for_active_placement() {
    let world = World::new().await;
    let permanent = world.open_request(RequestType::Permanent).await;
    let sitting = world.open_request(RequestType::PetSitting).await;

    let sitter = world.helper().await;
    let sitter_response = world.respond(&sitter, sitting.id).await;
    world.accept(sitter_response.id).await;

    let adopter = world.helper().await;
    let response = world.respond(&adopter, permanent.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let err = service::confirm(&world.db, &world.notifier, &adopter.actor(), transfer.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));

    let stored = transfer_db::get_transfer_by_id(&world.db, transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, Status::Pending);
    let owner = relationships::current_owner(&world.db, world.pet.id)
        .await
        .unwrap();
    assert_eq!(owner, Some(world.owner.id));

    request_service::finalize(&world.db, &world.notifier, &world.owner_actor(), sitting.id)
        .await
        .unwrap();
    let outcome = service::confirm(&world.db, &world.notifier, &adopter.actor(), transfer.id, true)
        .await
        .unwrap();
    assert_eq!(outcome.placement_request.status, RequestStatus::Finalized);
}

#[tokio::test]
async fn test_accept_after_ownership_moved_is_invalid() {
    let world = World::new().await;
    let request = world.open_request(RequestType::PetSitting).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;

    let new_owner = create_user(&world.db, Roles::User).await;
    relationships::transfer_ownership(&world.db, world.pet.id, world.owner.id, new_owner.id, Utc::now())
        .await
        .unwrap();

    let err = response_service::accept(&world.db, &world.notifier, &world.owner_actor(), response.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));

    let stored = response_db::get_response_by_id(&world.db, response.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ResponseStatus::Responded);
}

#[tokio::test]
async fn test_expire_overdue_unwinds_stale_handovers() {
    let world = World::new().await;
    let request = world.open_request(RequestType::FosterFree).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    let transfer = world.accept(response.id).await.transfer_request.unwrap();

    let expires_at = transfer.expires_at.expect("handovers get a deadline");
    assert!(expires_at > Utc::now() + Duration::days(service::HANDOVER_WINDOW_DAYS - 1));

    let now = Utc::now();
    assert_eq!(service::expire_overdue(&world.db, &world.notifier, now).await.unwrap(), 0);

    let later = now + Duration::days(service::HANDOVER_WINDOW_DAYS + 1);
    assert_eq!(service::expire_overdue(&world.db, &world.notifier, later).await.unwrap(), 1);

    let stored = transfer_db::get_transfer_by_id(&world.db, transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, Status::Expired);
    let stored_request = request_db::get_placement_request_by_id(&world.db, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_request.status, RequestStatus::Open);
    let stored_response = response_db::get_response_by_id(&world.db, response.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_response.status, ResponseStatus::Cancelled);

    assert_eq!(world.notifier.sent_to(world.owner.id, EventType::TransferExpired), 1);
    assert_eq!(world.notifier.sent_to(helper.user.id, EventType::TransferExpired), 1);

    assert_eq!(service::expire_overdue(&world.db, &world.notifier, later).await.unwrap(), 0);
    let err = service::confirm(&world.db, &world.notifier, &helper.actor(), transfer.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidState(_)));
}
