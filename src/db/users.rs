use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CreateUserFromAuth, Roles};

/// Find the user behind a validated token, creating the row on first sight
/// (called by the auth extractor).
pub async fn find_or_create_from_auth(
    db: &DatabaseConnection,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        display_name: Set(input.display_name),
        role: Set(input.role),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}

/// IDs of every admin, used to fan out dispute notifications.
pub async fn get_admin_ids<C: ConnectionTrait>(db: &C) -> Result<Vec<Uuid>, DbErr> {
    users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .filter(users::Column::Role.eq(Roles::Admin))
        .into_tuple()
        .all(db)
        .await
}
