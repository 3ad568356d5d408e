use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::PlacementError;
use crate::models::transfer_requests::ConfirmTransfer;
use crate::notifications::Notifier;
use crate::services::transfers as transfer_service;

/// POST /api/transfer-requests/{id}/confirm: the recipient confirms the
/// handover, or disputes it with `condition_confirmed: false`.
pub async fn confirm_transfer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<ConfirmTransfer>,
) -> Result<HttpResponse, PlacementError> {
    let outcome = transfer_service::confirm(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
        body.condition_confirmed,
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/transfer-requests/{id}/reject: the recipient declines the handover.
pub async fn reject_transfer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let outcome = transfer_service::reject(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/transfer-requests/{id}/cancel: either party calls the handover off.
pub async fn cancel_transfer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let outcome = transfer_service::cancel(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
