//! Cookie configuration and directive handling.
//!
//! The dispatcher never writes Set-Cookie headers itself: it queues
//! [`CookieDirective`]s on the view, which flushes them when the response is
//! produced. `CookieConfig` carries the attributes shared by all cookies the
//! application sets.

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};

/// Attributes applied to every cookie the application sets.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Whether to set the Secure flag (true outside development without TLS).
    pub secure: bool,
    /// Cookie path.
    pub path: String,
    /// SameSite policy.
    pub same_site: SameSite,
    /// Domain (None = current domain).
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            domain: None,
        }
    }
}

/// One queued cookie write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    pub name: String,
    pub value: String,
    /// HttpOnly cookies are invisible to client script; theme/locale and the
    /// tab-change fingerprint must stay readable.
    pub http_only: bool,
    /// Lifetime in seconds; None for a session cookie.
    pub max_age_seconds: Option<i64>,
}

impl CookieDirective {
    /// A script-readable cookie (theme, locale, tab-change fingerprint).
    pub fn readable(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            http_only: false,
            max_age_seconds: None,
        }
    }

    /// An HttpOnly cookie (session id, tokens).
    pub fn http_only(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            http_only: true,
            max_age_seconds: None,
        }
    }

    /// Set a lifetime in seconds.
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    /// Materialize the directive into an actix cookie.
    pub fn to_cookie(&self, config: &CookieConfig) -> Cookie<'static> {
        let mut builder = Cookie::build(self.name.clone(), self.value.clone())
            .path(config.path.clone())
            .http_only(self.http_only)
            .secure(config.secure)
            .same_site(config.same_site);

        if let Some(seconds) = self.max_age_seconds {
            builder = builder.max_age(CookieDuration::seconds(seconds));
        }

        let mut cookie = builder.finish();
        if let Some(ref domain) = config.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }
}

/// Create a cookie that clears/expires the named cookie.
pub fn create_clearing_cookie(name: &str, config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build(name.to_string(), "")
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish();

    if let Some(ref domain) = config.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_only_directive() {
        let config = CookieConfig::default();
        let cookie = CookieDirective::http_only("plinth_utoken", "tok").to_cookie(&config);
        assert_eq!(cookie.name(), "plinth_utoken");
        assert_eq!(cookie.value(), "tok");
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_readable_directive() {
        let config = CookieConfig::default();
        let cookie = CookieDirective::readable("theme", "dark").to_cookie(&config);
        assert!(!cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.value(), "dark");
    }

    #[test]
    fn test_max_age() {
        let config = CookieConfig::default();
        let directive = CookieDirective::http_only("sid", "abc").with_max_age(3600);
        let cookie = directive.to_cookie(&config);
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(3600)));
    }

    #[test]
    fn test_clearing_cookie() {
        let config = CookieConfig::default();
        let cookie = create_clearing_cookie("sid", &config);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
