pub mod auth;
pub mod placement_requests;
pub mod responses;
pub mod transfers;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Placement request routes (GET is public, everything else needs a JWT) ──
    cfg.service(
        web::scope("/placement-requests")
            .route("", web::post().to(placement_requests::create_placement_request))
            .route("/{id}", web::get().to(placement_requests::get_placement_request))
            .route(
                "/{id}/finalize",
                web::post().to(placement_requests::finalize_placement_request),
            )
            .route(
                "/{id}/cancel",
                web::post().to(placement_requests::cancel_placement_request),
            )
            .route(
                "/{id}/reject",
                web::post().to(placement_requests::reject_placement_request),
            )
            .route(
                "/{id}/responses",
                web::post().to(responses::respond_to_placement_request),
            ),
    );

    // ── Response routes ──
    cfg.service(
        web::scope("/placement-responses")
            .route("/{id}/accept", web::post().to(responses::accept_response))
            .route("/{id}/reject", web::post().to(responses::reject_response))
            .route("/{id}/cancel", web::post().to(responses::cancel_response)),
    );

    // ── Transfer routes ──
    cfg.service(
        web::scope("/transfer-requests")
            .route("/{id}/confirm", web::post().to(transfers::confirm_transfer))
            .route("/{id}/reject", web::post().to(transfers::reject_transfer))
            .route("/{id}/cancel", web::post().to(transfers::cancel_transfer)),
    );
}
