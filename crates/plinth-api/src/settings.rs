//! Settings consumed by the dispatch pipeline.
//!
//! The server config module builds one [`AppSettings`] at startup from its
//! TOML configuration; nothing in the pipeline reads cookie names or header
//! names from literals.

use plinth_auth::CookieConfig;

/// Configured cookie names.
#[derive(Debug, Clone)]
pub struct CookieKeys {
    pub session: String,
    pub utoken: String,
    pub theme: String,
    pub theme_color: String,
    pub lang: String,
    pub tab_changes: String,
}

impl Default for CookieKeys {
    fn default() -> Self {
        Self {
            session: "plinth_session".to_string(),
            utoken: "plinth_utoken".to_string(),
            theme: "plinth_theme".to_string(),
            theme_color: "plinth_theme_color".to_string(),
            lang: "plinth_lang".to_string(),
            tab_changes: "plinth_tab_changes".to_string(),
        }
    }
}

/// Application-level settings for dispatch.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Root prefix joined with every component-relative route.
    pub comp_route_root: String,
    /// Header that marks AJAX-style requests.
    pub ajax_header: String,
    /// Neutral route used when a handler does not supply one.
    pub default_neutral_route: String,
    pub cookie_keys: CookieKeys,
    pub cookie_config: CookieConfig,
    pub session_ttl_seconds: i64,
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    pub default_theme: String,
    pub default_theme_color: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            comp_route_root: "app".to_string(),
            ajax_header: "Requested-With-Ajax".to_string(),
            default_neutral_route: String::new(),
            cookie_keys: CookieKeys::default(),
            cookie_config: CookieConfig::default(),
            session_ttl_seconds: 60 * 60 * 24,
            default_locale: "es".to_string(),
            supported_locales: vec!["es".to_string(), "en".to_string()],
            default_theme: "light".to_string(),
            default_theme_color: "default".to_string(),
        }
    }
}

impl AppSettings {
    /// Pick the request locale: the cookie value when supported, the
    /// configured default otherwise.
    pub fn resolve_locale(&self, cookie_value: Option<&str>) -> String {
        match cookie_value {
            Some(value) if self.supported_locales.iter().any(|l| l == value) => value.to_string(),
            _ => self.default_locale.clone(),
        }
    }
}
