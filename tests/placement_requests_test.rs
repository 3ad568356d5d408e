//! Placement request lifecycle: creation guards, cancel, admin reject,
//! finalize, and the expiry sweep.

mod common;

use chrono::{Duration, Utc};

use common::{World, create_pet, create_pet_type, create_user, request_input};
use placement_backend::PlacementError;
use placement_backend::auth::authorization::Actor;
use placement_backend::db::placement_requests as request_db;
use placement_backend::db::relationships as relationship_db;
use placement_backend::models::placement_requests::{RequestType, Status};
use placement_backend::models::users::Roles;
use placement_backend::notifications::EventType;
use placement_backend::services::placement_requests as service;

#[tokio::test]
async fn test_create_opens_request_for_owner() {
    let world = World::new().await;

    let request = service::create(
        &world.db,
        &world.owner_actor(),
        request_input(world.pet.id, RequestType::FosterFree),
    )
    .await
    .unwrap();

    assert_eq!(request.status, Status::Open);
    assert_eq!(request.owner_user_id, world.owner.id);
    assert_eq!(request.request_type, RequestType::FosterFree);
}

#[tokio::test]
async fn test_admin_creates_on_behalf_of_owner() {
    let world = World::new().await;

    let request = service::create(
        &world.db,
        &world.admin_actor(),
        request_input(world.pet.id, RequestType::Permanent),
    )
    .await
    .unwrap();

    assert_eq!(request.owner_user_id, world.owner.id);
}

#[tokio::test]
async fn test_create_by_stranger_is_forbidden() {
    let world = World::new().await;
    let stranger = create_user(&world.db, Roles::User).await;

    let err = service::create(
        &world.db,
        &Actor::user(stranger.id),
        request_input(world.pet.id, RequestType::Permanent),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PlacementError::Forbidden));
}

#[tokio::test]
async fn test_create_for_unsupported_pet_type_is_denied() {
    let world = World::new().await;
    let fish = create_pet_type(&world.db, "fish", false).await;
    let pet = create_pet(&world.db, world.owner.id, &fish).await;

    let err = service::create(
        &world.db,
        &world.owner_actor(),
        request_input(pet.id, RequestType::Permanent),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PlacementError::CapabilityDenied));
}

#[tokio::test]
async fn test_create_for_unknown_pet_is_not_found() {
    let world = World::new().await;

    let err = service::create(
        &world.db,
        &world.owner_actor(),
        request_input(uuid::Uuid::new_v4(), RequestType::Permanent),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PlacementError::NotFound(_)));
}

#[tokio::test]
async fn test_second_live_request_of_same_type_is_rejected() {
    let world = World::new().await;
    world.open_request(RequestType::Permanent).await;

    let err = service::create(
        &world.db,
        &world.owner_actor(),
        request_input(world.pet.id, RequestType::Permanent),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PlacementError::DuplicateActiveRequest));
}

#[tokio::test]
async fn test_different_types_can_be_live_together() {
    let world = World::new().await;
    world.open_request(RequestType::Permanent).await;

    let sitting = service::create(
        &world.db,
        &world.owner_actor(),
        request_input(world.pet.id, RequestType::PetSitting),
    )
    .await
    .unwrap();

    assert_eq!(sitting.status, Status::Open);
}

#[tokio::test]
async fn test_cancelled_request_frees_its_type() {
    let world = World::new().await;
    let first = world.open_request(RequestType::Permanent).await;
    service::cancel(&world.db, &world.notifier, &world.owner_actor(), first.id)
        .await
        .unwrap();

    let second = world.open_request(RequestType::Permanent).await;
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_create_during_active_foster_conflicts() {
    let world = World::new().await;
    let foster = create_user(&world.db, Roles::User).await;
    relationship_db::insert_assignment(
        &world.db,
        world.pet.id,
        world.owner.id,
        foster.id,
        None,
        Utc::now().date_naive(),
        None,
    )
    .await
    .unwrap();

    let err = service::create(
        &world.db,
        &world.owner_actor(),
        request_input(world.pet.id, RequestType::PetSitting),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PlacementError::ActiveFosterConflict));
}

#[tokio::test]
async fn test_end_date_before_start_date_is_invalid() {
    let world = World::new().await;
    let today = Utc::now().date_naive();
    let mut input = request_input(world.pet.id, RequestType::FosterPaid);
    input.start_date = Some(today);
    input.end_date = Some(today - Duration::days(1));

    let err = service::create(&world.db, &world.owner_actor(), input)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_cancel_notifies_pending_helpers() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;
    world.respond(&helper, request.id).await;

    let cancelled = service::cancel(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap();

    assert_eq!(cancelled.status, Status::Cancelled);
    assert_eq!(
        world.notifier.sent_to(helper.user.id, EventType::PlacementCancelled),
        1
    );
}

#[tokio::test]
async fn test_cancel_twice_is_invalid() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    service::cancel(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap();

    let err = service::cancel(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_cancel_by_helper_is_forbidden() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    let helper = world.helper().await;

    let err = service::cancel(&world.db, &world.notifier, &helper.actor(), request.id)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::Forbidden));
}

#[tokio::test]
async fn test_reject_is_admin_only() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;

    let err = service::reject(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlacementError::Forbidden));

    let rejected = service::reject(&world.db, &world.notifier, &world.admin_actor(), request.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, Status::Cancelled);
    assert_eq!(
        world
            .notifier
            .sent_to(world.owner.id, EventType::PlacementRejectedByAdmin),
        1
    );
}

#[tokio::test]
async fn test_finalize_requires_active_request() {
    let world = World::new().await;
    let request = world.open_request(RequestType::PetSitting).await;

    let err = service::finalize(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::InvalidState(_)));
}

#[tokio::test]
async fn test_finalize_permanent_is_unsupported() {
    let world = World::new().await;
    let request = world.open_request(RequestType::Permanent).await;
    request_db::update_status(&world.db, request.clone(), Status::Active)
        .await
        .unwrap();

    let err = service::finalize(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::UnsupportedType));
}

#[tokio::test]
async fn test_finalize_pet_sitting_notifies_helper() {
    let world = World::new().await;
    let request = world.open_request(RequestType::PetSitting).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    world.accept(response.id).await;

    let finalized = service::finalize(&world.db, &world.notifier, &world.owner_actor(), request.id)
        .await
        .unwrap();

    assert_eq!(finalized.status, Status::Finalized);
    assert_eq!(
        world.notifier.sent_to(helper.user.id, EventType::PlacementFinalized),
        1
    );
}

#[tokio::test]
async fn test_finalize_by_helper_is_forbidden() {
    let world = World::new().await;
    let request = world.open_request(RequestType::PetSitting).await;
    let helper = world.helper().await;
    let response = world.respond(&helper, request.id).await;
    world.accept(response.id).await;

    let err = service::finalize(&world.db, &world.notifier, &helper.actor(), request.id)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacementError::Forbidden));
}

#[tokio::test]
async fn test_expire_overdue_only_touches_past_open_requests() {
    let world = World::new().await;
    let now = Utc::now();

    let mut overdue = request_input(world.pet.id, RequestType::Permanent);
    overdue.expires_at = Some(now - Duration::hours(2));
    let overdue = service::create(&world.db, &world.owner_actor(), overdue)
        .await
        .unwrap();

    let mut future = request_input(world.pet.id, RequestType::PetSitting);
    future.expires_at = Some(now + Duration::hours(2));
    let future = service::create(&world.db, &world.owner_actor(), future)
        .await
        .unwrap();

    let expired = service::expire_overdue(&world.db, &world.notifier, now)
        .await
        .unwrap();
    assert_eq!(expired, 1);

    let overdue = request_db::get_placement_request_by_id(&world.db, overdue.id)
        .await
        .unwrap()
        .unwrap();
    let future = request_db::get_placement_request_by_id(&world.db, future.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(overdue.status, Status::Expired);
    assert_eq!(future.status, Status::Open);
    assert_eq!(
        world.notifier.sent_to(world.owner.id, EventType::PlacementExpired),
        1
    );

    let again = service::expire_overdue(&world.db, &world.notifier, now)
        .await
        .unwrap();
    assert_eq!(again, 0);
}
