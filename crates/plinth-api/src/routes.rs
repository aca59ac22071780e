//! Route configuration.

use actix_web::web;

use crate::handlers;

/// Configure the application routes.
///
/// - `GET /healthcheck` — liveness probe
/// - `GET /ftoken/{key}/{fetch_id}/{form_id}` — AJAX-only form token
/// - `GET /` and `GET /{route}` — component dispatch
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthcheck", web::get().to(handlers::healthcheck))
        .route(
            "/ftoken/{key}/{fetch_id}/{form_id}",
            web::get().to(handlers::ftoken),
        )
        .route("/", web::get().to(handlers::index))
        .route("/{route:.*}", web::get().to(handlers::dispatch_route));
}
