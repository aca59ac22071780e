//! Per-request dispatch pipeline.
//!
//! One Dispatcher is constructed per incoming request. It assembles the
//! typed request context — route identity, session snapshot, current-user
//! projection, tokens, nonce, locale/theme — and queues the cookie writes
//! the response must carry. Route-specific logic runs after dispatch and
//! renders through the view.

use actix_web::http::Method;
use actix_web::{HttpMessage, HttpRequest};
use plinth_auth::{
    generate_nonce, ltoken_create, tab_change_fingerprint, utoken_extract, utoken_update,
    CookieDirective, UtokenCookie,
};
use plinth_session::{
    resolve_session, user_id_from_session, CurrentUser, LocaleSelection, RequestContext,
    RouteIdentity, ThemeSelection,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::registry::ComponentRegistry;
use crate::state::AppState;
use crate::view::View;

/// Path marker that introduces a component name in a neutral route.
const COMPONENT_MARKER: &str = "/component/cmp_";

/// Per-request CSP nonce, shared with the security-headers middleware via
/// request extensions.
#[derive(Debug, Clone)]
pub struct CspNonce(pub String);

/// The assembled per-request pipeline.
pub struct Dispatcher {
    pub context: RequestContext,
    pub view: View,
    incoming_ltoken: Option<String>,
    ajax_request: bool,
}

impl Dispatcher {
    /// Run the dispatch pipeline for one request.
    ///
    /// `comp_route` is the component-relative route; `neutral_route`
    /// identifies the serving component (defaulted from settings when the
    /// handler has none); `ltoken` is an incoming long token from a form
    /// submission, kept for later validation.
    pub async fn dispatch(
        req: &HttpRequest,
        state: &AppState,
        comp_route: &str,
        neutral_route: Option<&str>,
        ltoken: Option<&str>,
    ) -> Result<Self, ApiError> {
        let settings = &state.settings;

        let ajax_request = req
            .headers()
            .get(&settings.ajax_header)
            .map(|value| !value.is_empty())
            .unwrap_or(false);

        // Route identity.
        let comp_route_full =
            format!("{}/{}", settings.comp_route_root, comp_route).trim_matches('/').to_string();
        let neutral_route = neutral_route
            .map(str::to_string)
            .unwrap_or_else(|| settings.default_neutral_route.clone());
        let (comp_name, comp_uuid) = match extract_comp_from_path(&neutral_route, &state.registry)?
        {
            Some((name, uuid)) => (Some(name), Some(uuid)),
            None => (None, None),
        };
        let route = RouteIdentity {
            comp_route_sanitized: comp_route_full.replace('/', ":"),
            comp_route: comp_route_full,
            neutral_route,
            comp_name,
            comp_uuid,
        };

        let mut context = RequestContext::new(route, ajax_request);
        let mut view = View::new(settings.cookie_config.clone());

        // Session: resolve from cookie, creating one on first visit.
        let session_cookie = cookie_value(req, &settings.cookie_keys.session);
        let session = resolve_session(
            session_cookie.as_deref(),
            state.sessions.as_ref(),
            &settings.cookie_keys.session,
            settings.session_ttl_seconds,
        )
        .await?;
        context.session_id = Some(session.id.clone());
        context.session_data = session.properties.clone();
        context.has_session = true;

        // Current user: the role store is consulted only when the session
        // actually carries a user id.
        let db_roles = match user_id_from_session(&context.session_data) {
            Some(user_id) => Some(state.roles.get_roles(&user_id).await?),
            None => None,
        };
        context.current_user = CurrentUser::project(&context.session_data, db_roles);

        // One nonce per request, owned by this context. The response
        // middleware reads it back for the Content-Security-Policy header.
        context.csp_nonce = generate_nonce();
        req.extensions_mut().insert(CspNonce(context.csp_nonce.clone()));

        // UTOKEN: only plain navigational GETs may rotate the token, so an
        // in-flight form or AJAX call never invalidates token state.
        let prev_utoken = cookie_value(req, &settings.cookie_keys.utoken);
        let (utoken, utoken_cookie) = if req.method() == Method::GET && !ajax_request {
            let (token, cookie) = utoken_update(prev_utoken.as_deref());
            (Some(token), cookie)
        } else {
            utoken_extract(prev_utoken.as_deref())
        };
        context.utoken = utoken;
        if !ajax_request {
            match utoken_cookie {
                UtokenCookie::Set(value) | UtokenCookie::Refresh(Some(value)) => {
                    view.add_cookie(CookieDirective::http_only(
                        settings.cookie_keys.utoken.as_str(),
                        value,
                    ));
                }
                UtokenCookie::Refresh(None) => {}
            }
        }

        context.ltoken = ltoken_create(context.utoken.as_deref());

        // Locale and theme selections from cookies, defaulted from config.
        let theme = cookie_value(req, &settings.cookie_keys.theme)
            .unwrap_or_else(|| settings.default_theme.clone());
        let color = cookie_value(req, &settings.cookie_keys.theme_color)
            .unwrap_or_else(|| settings.default_theme_color.clone());
        let locale =
            settings.resolve_locale(cookie_value(req, &settings.cookie_keys.lang).as_deref());
        context.theme = ThemeSelection {
            theme: theme.clone(),
            color: color.clone(),
        };
        context.locale = LocaleSelection {
            current: locale.clone(),
        };

        // Plain navigation also refreshes the client-visible cookies.
        if !ajax_request {
            let fingerprint =
                tab_change_fingerprint(context.utoken.as_deref(), context.session_id.as_deref());
            view.add_cookie(session.cookie.clone());
            view.add_cookie(CookieDirective::readable(
                settings.cookie_keys.tab_changes.as_str(),
                fingerprint,
            ));
            view.add_cookie(CookieDirective::readable(settings.cookie_keys.theme.as_str(), theme));
            view.add_cookie(CookieDirective::readable(
                settings.cookie_keys.theme_color.as_str(),
                color,
            ));
            view.add_cookie(CookieDirective::readable(settings.cookie_keys.lang.as_str(), locale));
        }

        Ok(Self {
            context,
            view,
            incoming_ltoken: ltoken.map(str::to_string),
            ajax_request,
        })
    }

    /// Whether the request carried the AJAX marker header.
    pub fn is_ajax(&self) -> bool {
        self.ajax_request
    }

    /// Long token supplied by the caller, if any.
    pub fn incoming_ltoken(&self) -> Option<&str> {
        self.incoming_ltoken.as_deref()
    }

    /// Render the assembled context through the view.
    pub fn render(&self) -> actix_web::HttpResponse {
        self.view.render(&self.context)
    }
}

/// Extract the component name and UUID from a neutral route path.
///
/// Returns `None` when the path carries no component marker. A marker whose
/// name is absent from the registry is a typed error: the registry is fully
/// populated at startup, so this is a malformed or hostile route.
pub fn extract_comp_from_path(
    path: &str,
    registry: &ComponentRegistry,
) -> Result<Option<(String, Uuid)>, ApiError> {
    let Some(idx) = path.find(COMPONENT_MARKER) else {
        return Ok(None);
    };
    let part = &path[idx + COMPONENT_MARKER.len()..];
    let name = format!("cmp_{}", part.split('/').next().unwrap_or(""));
    match registry.uuid_by_name(&name) {
        Some(uuid) => Ok(Some((name, uuid))),
        None => Err(ApiError::UnknownComponent(name)),
    }
}

fn cookie_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.cookie(name).map(|cookie| cookie.value().to_string())
}
