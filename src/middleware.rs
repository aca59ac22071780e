//! Server-wide middleware configuration helpers.
//!
//! Keeps the Actix application setup focused by providing reusable
//! constructors for the host guard, security headers, CORS, and logging
//! layers.
//!
//! ## Stack (applied in order)
//!
//! 1. **HostGuard**: rejects requests with a disallowed Host header (HTTP
//!    400) before any dispatch work happens
//! 2. **CORS**: cross-origin resource sharing policy (via actix-cors)
//! 3. **Logger**: request/response logging
//! 4. **SecurityHeaders**: response headers including the per-request CSP

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::middleware;
use actix_web::{Error, HttpMessage as _, HttpResponse};
use futures_util::future::LocalBoxFuture;
use log::{debug, warn};
use plinth_api::CspNonce;
use plinth_commons::net::{is_allowed_host, normalize_host};
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::config::ServerConfig;

/// Build CORS middleware from server configuration using actix-cors.
pub fn build_cors_from_config(config: &ServerConfig) -> Cors {
    let cors_config = &config.security.cors;

    let mut cors = Cors::default();

    // Configure allowed origins
    if cors_config.allowed_origins.is_empty()
        || cors_config.allowed_origins.contains(&"*".to_string())
    {
        cors = cors.allow_any_origin();
        debug!("CORS: Allowing any origin");
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        debug!("CORS: Allowed origins: {:?}", cors_config.allowed_origins);
    }

    // Configure allowed methods
    let methods: Vec<Method> =
        cors_config.allowed_methods.iter().filter_map(|m| m.parse().ok()).collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    // Configure allowed headers
    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_any_header();
    } else {
        let headers: Vec<HeaderName> =
            cors_config.allowed_headers.iter().filter_map(|h| h.parse().ok()).collect();
        if !headers.is_empty() {
            cors = cors.allowed_headers(headers);
        }
    }

    // Configure exposed headers
    if !cors_config.expose_headers.is_empty() {
        let expose_headers: Vec<HeaderName> =
            cors_config.expose_headers.iter().filter_map(|h| h.parse().ok()).collect();
        cors = cors.expose_headers(expose_headers);
    }

    if cors_config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors = cors.max_age(cors_config.max_age as usize);

    cors
}

/// Build the request logger middleware.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::default()
}

// ============================================================================
// Host Guard Middleware
// ============================================================================

/// Host allow-list guard factory.
///
/// First line of the stack: a request whose Host header fails the
/// configured allow-list is answered with HTTP 400 before any session,
/// token, or store work happens.
#[derive(Clone)]
pub struct HostGuard {
    allowed_hosts: Rc<Vec<String>>,
}

impl HostGuard {
    pub fn new(allowed_hosts: Vec<String>) -> Self {
        Self {
            allowed_hosts: Rc::new(allowed_hosts),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.security.allowed_hosts.clone())
    }
}

impl<S, B> Transform<S, ServiceRequest> for HostGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = HostGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HostGuardMiddleware {
            service,
            allowed_hosts: self.allowed_hosts.clone(),
        }))
    }
}

/// The actual middleware service that checks each request.
pub struct HostGuardMiddleware<S> {
    service: S,
    allowed_hosts: Rc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for HostGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let host = req.connection_info().host().to_string();
        let normalized = normalize_host(&host);

        if is_allowed_host(&normalized, &self.allowed_hosts) {
            let fut = self.service.call(req);
            Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            })
        } else {
            warn!("[HOST_GUARD] Rejected host '{}' path={}", host, req.path());
            let response = HttpResponse::build(StatusCode::BAD_REQUEST).json(serde_json::json!({
                "error": "DISALLOWED_HOST",
                "message": "Host header is not in the allow-list",
            }));
            Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
        }
    }
}

// ============================================================================
// Security Headers Middleware
// ============================================================================

/// Static parts of the security header set, computed once from config.
#[derive(Debug, Clone)]
struct SecurityHeaderValues {
    referrer_policy: String,
    permissions_policy: Option<String>,
    csp_scripts: String,
    csp_styles: String,
    csp_imgs: String,
    csp_fonts: String,
    csp_connects: String,
}

impl SecurityHeaderValues {
    /// Content-Security-Policy for one response. The per-request nonce, when
    /// present, is appended to the script and style source lists.
    fn csp(&self, nonce: Option<&str>) -> String {
        let nonce_part = nonce.map(|n| format!(" 'nonce-{n}'")).unwrap_or_default();
        format!(
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline' {}{}; \
             style-src 'self' 'unsafe-inline' {}{}; \
             img-src 'self' data: {}; \
             font-src 'self' {}; \
             connect-src 'self' {}; \
             frame-ancestors 'none'; \
             base-uri 'self'; \
             form-action 'self';",
            self.csp_scripts,
            nonce_part,
            self.csp_styles,
            nonce_part,
            self.csp_imgs,
            self.csp_fonts,
            self.csp_connects,
        )
    }
}

/// Security headers factory.
///
/// Adds the fixed protection headers plus a Content-Security-Policy built
/// from the configured source allow-lists and the request's CSP nonce.
#[derive(Clone)]
pub struct SecurityHeaders {
    values: Rc<SecurityHeaderValues>,
}

impl SecurityHeaders {
    pub fn from_config(config: &ServerConfig) -> Self {
        let security = &config.security;
        let join = |list: &[String]| -> String {
            list.iter().filter(|s| !s.trim().is_empty()).cloned().collect::<Vec<_>>().join(" ")
        };
        Self {
            values: Rc::new(SecurityHeaderValues {
                referrer_policy: security.referrer_policy.clone(),
                permissions_policy: security.permissions_policy.clone(),
                csp_scripts: join(&security.csp_allowed_script),
                csp_styles: join(&security.csp_allowed_style),
                csp_imgs: join(&security.csp_allowed_img),
                csp_fonts: join(&security.csp_allowed_font),
                csp_connects: join(&security.csp_allowed_connect),
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service,
            values: self.values.clone(),
        }))
    }
}

pub struct SecurityHeadersMiddleware<S> {
    service: S,
    values: Rc<SecurityHeaderValues>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let values = self.values.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            let nonce = {
                let extensions = res.request().extensions();
                extensions.get::<CspNonce>().map(|n| n.0.clone())
            };

            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            );
            headers.insert(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            );
            headers.insert(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            );
            if let Ok(value) = HeaderValue::from_str(&values.referrer_policy) {
                headers.insert(HeaderName::from_static("referrer-policy"), value);
            }
            if let Some(policy) = &values.permissions_policy {
                if let Ok(value) = HeaderValue::from_str(policy) {
                    headers.insert(HeaderName::from_static("permissions-policy"), value);
                }
            }
            if let Ok(value) = HeaderValue::from_str(&values.csp(nonce.as_deref())) {
                headers.insert(HeaderName::from_static("content-security-policy"), value);
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_includes_nonce_when_present() {
        let values = SecurityHeaderValues {
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
            permissions_policy: None,
            csp_scripts: "https://cdn.example".to_string(),
            csp_styles: String::new(),
            csp_imgs: String::new(),
            csp_fonts: String::new(),
            csp_connects: String::new(),
        };

        let with_nonce = values.csp(Some("abc123"));
        assert!(with_nonce.contains("'nonce-abc123'"));
        assert!(with_nonce.contains("https://cdn.example"));
        assert!(with_nonce.contains("frame-ancestors 'none'"));

        let without = values.csp(None);
        assert!(!without.contains("nonce-"));
    }
}
