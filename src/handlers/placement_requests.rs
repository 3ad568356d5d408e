use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::PlacementError;
use crate::models::placement_requests::{self, CreatePlacementRequest};
use crate::notifications::Notifier;
use crate::services::placement_requests as placement_service;
use crate::services::viewer::{self, HelperResponse, ViewerContext};

/// Body of GET /api/placement-requests/{id}.
#[derive(Debug, Serialize)]
pub struct PlacementRequestView {
    pub placement_request: placement_requests::Model,
    /// Only present for the owner and admins.
    pub responses: Option<Vec<HelperResponse>>,
    pub viewer: ViewerContext,
}

/// POST /api/placement-requests: the pet's owner opens a placement request.
pub async fn create_placement_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreatePlacementRequest>,
) -> Result<HttpResponse, PlacementError> {
    let request = placement_service::create(db.get_ref(), &user.actor(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(request))
}

/// GET /api/placement-requests/{id}: the request plus what the caller may do.
///
/// Anonymous callers get the public view.
pub async fn get_placement_request(
    user: Option<AuthenticatedUser>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let actor = user.as_ref().map(AuthenticatedUser::actor);
    let (snapshot, context) =
        viewer::load_viewer_context(db.get_ref(), actor.as_ref(), path.into_inner()).await?;

    let manages = actor.is_some_and(|a| a.can_manage(&snapshot.request));
    Ok(HttpResponse::Ok().json(PlacementRequestView {
        placement_request: snapshot.request,
        responses: manages.then_some(snapshot.responses),
        viewer: context,
    }))
}

/// POST /api/placement-requests/{id}/finalize: end an active temporary placement.
pub async fn finalize_placement_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let request = placement_service::finalize(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// POST /api/placement-requests/{id}/cancel: owner or admin withdraws an open request.
pub async fn cancel_placement_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let request = placement_service::cancel(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// POST /api/placement-requests/{id}/reject: admin takes an open request down.
pub async fn reject_placement_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PlacementError> {
    let request = placement_service::reject(
        db.get_ref(),
        notifier.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(request))
}
