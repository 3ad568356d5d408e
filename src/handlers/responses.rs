use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::PlacementError;
use crate::models::placement_request_responses::RespondToPlacementRequest;
use crate::notifications::Notifier;
use crate::services::responses as response_service;

/// POST /api/placement-requests/{id}/responses: a helper responds with one of
/// their helper profiles.
pub async fn respond_to_placement_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<RespondToPlacementRequest>,
) -> Result<HttpResponse, PlacementError> {
    let response = response_service::respond(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/placement-responses/{id}/accept
pub async fn accept_response(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let accepted = response_service::accept(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(accepted))
}

/// POST /api/placement-responses/{id}/reject
pub async fn reject_response(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let response = response_service::reject(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/placement-responses/{id}/cancel: the helper withdraws their response.
pub async fn cancel_response(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let response = response_service::cancel(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(response))
}
