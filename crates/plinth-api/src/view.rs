//! View: cookie queue plus context rendering.
//!
//! The dispatcher mutates only the cookie queue; rendering serializes the
//! typed request context. Template-engine rendering is an external concern —
//! the starter ships the context itself, which is also what AJAX consumers
//! want.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use plinth_auth::{CookieConfig, CookieDirective};
use plinth_session::RequestContext;
use serde_json::json;

/// Per-request response builder owned by the Dispatcher.
pub struct View {
    cookie_config: CookieConfig,
    cookies: Vec<CookieDirective>,
}

impl View {
    pub fn new(cookie_config: CookieConfig) -> Self {
        Self {
            cookie_config,
            cookies: Vec::new(),
        }
    }

    /// Queue a cookie write; flushed when the response is produced.
    pub fn add_cookie(&mut self, directive: CookieDirective) {
        self.cookies.push(directive);
    }

    /// Queued directives, in insertion order.
    pub fn cookies(&self) -> &[CookieDirective] {
        &self.cookies
    }

    /// Render the assembled context, flushing queued cookies.
    pub fn render(&self, context: &RequestContext) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for directive in &self.cookies {
            builder.cookie(directive.to_cookie(&self.cookie_config));
        }
        builder.json(context)
    }

    /// Render an error page response. Cookies are not flushed: an errored
    /// dispatch must not persist token or session state.
    pub fn render_error(&self, status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status).json(json!({
            "error": status.as_u16(),
            "message": message,
        }))
    }
}
