//! Pet ↔ user relationship edges and foster assignments.
//!
//! These functions only ever run inside a caller's transaction. Each one
//! takes the pet row lock itself (re-locking a row the transaction already
//! holds is a no-op), so the open `owner` edge of a pet is only ever mutated
//! by one transaction at a time.

use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::db::pets as pet_db;
use crate::db::relationships as relationship_db;
use crate::error::{PlacementError, Result};
use crate::models::foster_assignments;
use crate::models::pet_relationships::{self, RelationshipType};

/// The user holding the open `owner` edge.
pub async fn current_owner<C: ConnectionTrait>(conn: &C, pet_id: Uuid) -> Result<Option<Uuid>> {
    Ok(relationship_db::get_open_edge(conn, pet_id, RelationshipType::Owner)
        .await?
        .map(|edge| edge.user_id))
}

pub async fn has_active_foster<C: ConnectionTrait>(conn: &C, pet_id: Uuid) -> Result<bool> {
    Ok(relationship_db::get_active_assignment(conn, pet_id)
        .await?
        .is_some())
}

async fn lock_pet<C: ConnectionTrait>(conn: &C, pet_id: Uuid) -> Result<()> {
    pet_db::lock_pet(conn, pet_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| PlacementError::not_found("Pet"))
}

/// Close `from_user`'s owner edge and open one for `to_user`, both at `at`.
///
/// Both writes land in the caller's transaction, so no reader ever sees zero
/// or two open owner edges.
pub async fn transfer_ownership<C: ConnectionTrait>(
    conn: &C,
    pet_id: Uuid,
    from_user: Uuid,
    to_user: Uuid,
    at: DateTime<Utc>,
) -> Result<pet_relationships::Model> {
    lock_pet(conn, pet_id).await?;

    let current = relationship_db::get_open_edge(conn, pet_id, RelationshipType::Owner)
        .await?
        .ok_or_else(|| PlacementError::invalid_state("pet has no current owner"))?;

    if current.user_id != from_user {
        return Err(PlacementError::invalid_state(
            "ownership can only be transferred by the current owner",
        ));
    }

    relationship_db::close_edge(conn, current, at).await?;
    let edge = relationship_db::insert_edge(conn, pet_id, to_user, RelationshipType::Owner, at)
        .await
        .map_err(|e| {
            PlacementError::from_write(e, PlacementError::invalid_state("pet already has an owner"))
        })?;

    tracing::info!(%pet_id, %from_user, %to_user, "ownership transferred");
    Ok(edge)
}

/// Open a foster edge and an `Active` foster assignment. The owner edge is
/// left untouched.
pub async fn start_foster<C: ConnectionTrait>(
    conn: &C,
    pet_id: Uuid,
    foster_user: Uuid,
    owner_user: Uuid,
    transfer_request_id: Option<Uuid>,
    start_date: chrono::NaiveDate,
    expected_end_date: Option<chrono::NaiveDate>,
) -> Result<foster_assignments::Model> {
    lock_pet(conn, pet_id).await?;

    if relationship_db::get_active_assignment(conn, pet_id)
        .await?
        .is_some()
    {
        return Err(PlacementError::ActiveFosterConflict);
    }

    relationship_db::insert_edge(
        conn,
        pet_id,
        foster_user,
        RelationshipType::Foster,
        Utc::now(),
    )
    .await?;

    let assignment = relationship_db::insert_assignment(
        conn,
        pet_id,
        owner_user,
        foster_user,
        transfer_request_id,
        start_date,
        expected_end_date,
    )
    .await?;

    tracing::info!(%pet_id, %foster_user, assignment_id = %assignment.id, "foster started");
    Ok(assignment)
}

/// Close `foster_user`'s foster edge and complete the active assignment.
pub async fn end_foster<C: ConnectionTrait>(
    conn: &C,
    pet_id: Uuid,
    foster_user: Uuid,
    at: DateTime<Utc>,
) -> Result<foster_assignments::Model> {
    lock_pet(conn, pet_id).await?;

    let assignment = relationship_db::get_active_assignment(conn, pet_id)
        .await?
        .filter(|a| a.foster_user_id == foster_user)
        .ok_or_else(|| PlacementError::invalid_state("no active foster assignment for this user"))?;

    for edge in relationship_db::get_open_edges(conn, pet_id, RelationshipType::Foster).await? {
        if edge.user_id == foster_user {
            relationship_db::close_edge(conn, edge, at).await?;
        }
    }

    let assignment = relationship_db::complete_assignment(conn, assignment, at.date_naive()).await?;

    tracing::info!(%pet_id, %foster_user, assignment_id = %assignment.id, "foster ended");
    Ok(assignment)
}
