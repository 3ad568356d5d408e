use sea_orm::*;
use uuid::Uuid;

use crate::models::foster_assignments;
use crate::models::pet_relationships::{self, RelationshipType};

/// The open edge of a given type for a pet, if any.
pub async fn get_open_edge<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
    relationship_type: RelationshipType,
) -> Result<Option<pet_relationships::Model>, DbErr> {
    pet_relationships::Entity::find()
        .filter(pet_relationships::Column::PetId.eq(pet_id))
        .filter(pet_relationships::Column::RelationshipType.eq(relationship_type))
        .filter(pet_relationships::Column::EndAt.is_null())
        .order_by_desc(pet_relationships::Column::StartAt)
        .one(db)
        .await
}

/// Every open edge of a given type for a pet.
pub async fn get_open_edges<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
    relationship_type: RelationshipType,
) -> Result<Vec<pet_relationships::Model>, DbErr> {
    pet_relationships::Entity::find()
        .filter(pet_relationships::Column::PetId.eq(pet_id))
        .filter(pet_relationships::Column::RelationshipType.eq(relationship_type))
        .filter(pet_relationships::Column::EndAt.is_null())
        .all(db)
        .await
}

/// Open a new edge starting at `at`.
pub async fn insert_edge<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
    user_id: Uuid,
    relationship_type: RelationshipType,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<pet_relationships::Model, DbErr> {
    let edge = pet_relationships::ActiveModel {
        id: Set(Uuid::new_v4()),
        pet_id: Set(pet_id),
        user_id: Set(user_id),
        relationship_type: Set(relationship_type),
        start_at: Set(at),
        end_at: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    edge.insert(db).await
}

/// Close an open edge at `at`.
pub async fn close_edge<C: ConnectionTrait>(
    db: &C,
    edge: pet_relationships::Model,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<pet_relationships::Model, DbErr> {
    let mut active: pet_relationships::ActiveModel = edge.into();
    active.end_at = Set(Some(at));

    active.update(db).await
}

/// The pet's active foster assignment, if any.
pub async fn get_active_assignment<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
) -> Result<Option<foster_assignments::Model>, DbErr> {
    foster_assignments::Entity::find()
        .filter(foster_assignments::Column::PetId.eq(pet_id))
        .filter(foster_assignments::Column::Status.eq(foster_assignments::Status::Active))
        .one(db)
        .await
}

/// Insert an `Active` foster assignment.
pub async fn insert_assignment<C: ConnectionTrait>(
    db: &C,
    pet_id: Uuid,
    owner_user_id: Uuid,
    foster_user_id: Uuid,
    transfer_request_id: Option<Uuid>,
    start_date: chrono::NaiveDate,
    expected_end_date: Option<chrono::NaiveDate>,
) -> Result<foster_assignments::Model, DbErr> {
    let assignment = foster_assignments::ActiveModel {
        id: Set(Uuid::new_v4()),
        pet_id: Set(pet_id),
        owner_user_id: Set(owner_user_id),
        foster_user_id: Set(foster_user_id),
        transfer_request_id: Set(transfer_request_id),
        start_date: Set(start_date),
        expected_end_date: Set(expected_end_date),
        actual_end_date: Set(None),
        status: Set(foster_assignments::Status::Active),
        created_at: Set(chrono::Utc::now()),
    };

    assignment.insert(db).await
}

/// Mark an assignment `Completed` with the given end date.
pub async fn complete_assignment<C: ConnectionTrait>(
    db: &C,
    assignment: foster_assignments::Model,
    actual_end_date: chrono::NaiveDate,
) -> Result<foster_assignments::Model, DbErr> {
    let mut active: foster_assignments::ActiveModel = assignment.into();
    active.status = Set(foster_assignments::Status::Completed);
    active.actual_end_date = Set(Some(actual_end_date));

    active.update(db).await
}
