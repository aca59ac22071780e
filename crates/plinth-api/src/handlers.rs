//! HTTP handlers.
//!
//! Handlers run the dispatch pipeline and render the assembled context;
//! business logic beyond the pipeline belongs to the components themselves.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::dispatcher::Dispatcher;
use crate::error::ApiError;
use crate::state::AppState;

/// Name of the form-token component in the registry.
pub const FTOKEN_COMPONENT: &str = "cmp_2300_ftoken";

/// GET /healthcheck
pub async fn healthcheck() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /
pub async fn index(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let dispatcher = Dispatcher::dispatch(&req, &state, "", None, None).await?;
    Ok(dispatcher.render())
}

/// GET /{route} — catch-all component dispatch.
pub async fn dispatch_route(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let route = path.into_inner();
    let dispatcher = Dispatcher::dispatch(&req, &state, &route, None, None).await?;
    Ok(dispatcher.render())
}

/// GET /ftoken/{key}/{fetch_id}/{form_id}
///
/// AJAX-only: the request must carry the configured AJAX marker header.
/// Returns the rendered context with the derived form token attached.
pub async fn ftoken(
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if req.headers().get(&state.settings.ajax_header).is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "REQUIRE_AJAX",
            "message": "Require Ajax",
        })));
    }

    let (key, fetch_id, form_id) = path.into_inner();
    let neutral_route = state.registry.get(FTOKEN_COMPONENT).map(|entry| entry.route.clone());

    let mut dispatcher =
        Dispatcher::dispatch(&req, &state, "", neutral_route.as_deref(), None).await?;

    let token =
        plinth_auth::ftoken_create(&key, &fetch_id, &form_id, dispatcher.context.utoken.as_deref());
    dispatcher.context.insert_extra("ftoken", json!(token));
    dispatcher.context.insert_extra("dispatch_result", json!(true));

    Ok(dispatcher.render())
}
