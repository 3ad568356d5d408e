use sea_orm::*;
use uuid::Uuid;

use crate::models::{helper_profiles, pet_types, pets};

/// Fetch a pet type by ID.
pub async fn get_pet_type<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<pet_types::Model>, DbErr> {
    pet_types::Entity::find_by_id(id).one(db).await
}

/// Take the per-pet row lock (`SELECT ... FOR UPDATE`).
///
/// Every write that touches a pet's relationship edges or its live placement
/// requests goes through this lock first, which serializes them per pet.
pub async fn lock_pet<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<pets::Model>, DbErr> {
    tracing::debug!(pet_id = %id, "locking pet row");
    pets::Entity::find_by_id(id).lock_exclusive().one(db).await
}

/// Fetch a helper profile by ID.
pub async fn get_helper_profile<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<helper_profiles::Model>, DbErr> {
    helper_profiles::Entity::find_by_id(id).one(db).await
}

/// IDs of every helper profile owned by a user.
pub async fn get_helper_profile_ids_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    helper_profiles::Entity::find()
        .select_only()
        .column(helper_profiles::Column::Id)
        .filter(helper_profiles::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await
}
