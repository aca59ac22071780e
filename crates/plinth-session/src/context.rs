//! Typed per-request context.
//!
//! The request context replaces the mutable, stringly-keyed schema mapping
//! of dictionary-based dispatchers with named fields. One Dispatcher owns
//! one context; it is discarded when the response is produced.
//!
//! Serialization keys keep the template contract (`CURRENT_COMP_ROUTE`,
//! `CURRENT_USER`, `CSP_NONCE`, ...) so rendered output matches what
//! templates already consume.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::current_user::CurrentUser;

/// Which component serves this request, and under which routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteIdentity {
    /// Component-relative route joined with the configured root prefix.
    #[serde(rename = "CURRENT_COMP_ROUTE")]
    pub comp_route: String,
    /// Route with slashes collapsed for use in attribute/id values.
    #[serde(rename = "CURRENT_COMP_ROUTE_SANITIZED")]
    pub comp_route_sanitized: String,
    /// Canonical route identifying the pluggable component.
    #[serde(rename = "CURRENT_NEUTRAL_ROUTE")]
    pub neutral_route: String,
    #[serde(rename = "CURRENT_COMP_NAME")]
    pub comp_name: Option<String>,
    #[serde(rename = "CURRENT_COMP_UUID")]
    pub comp_uuid: Option<Uuid>,
}

/// Theme cookie selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeSelection {
    pub theme: String,
    pub color: String,
}

/// Locale selection for this request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocaleSelection {
    pub current: String,
}

/// Everything the dispatch pipeline assembles for one request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    #[serde(flatten)]
    pub route: RouteIdentity,

    #[serde(rename = "SESSION")]
    pub session_id: Option<String>,
    #[serde(rename = "SESSION_DATA")]
    pub session_data: Value,
    #[serde(rename = "HAS_SESSION")]
    pub has_session: bool,

    #[serde(rename = "CURRENT_USER")]
    pub current_user: CurrentUser,

    #[serde(rename = "UTOKEN")]
    pub utoken: Option<String>,
    #[serde(rename = "LTOKEN")]
    pub ltoken: String,
    #[serde(rename = "CSP_NONCE")]
    pub csp_nonce: String,

    #[serde(rename = "LOCALE")]
    pub locale: LocaleSelection,
    #[serde(rename = "THEME")]
    pub theme: ThemeSelection,

    /// Whether the request carried the AJAX marker header.
    #[serde(rename = "AJAX_REQUEST")]
    pub ajax_request: bool,

    /// Route-specific payload merged into the rendered context
    /// (`dispatch_result`, `ftoken`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RequestContext {
    /// Empty context for a request that has not been dispatched yet.
    pub fn new(route: RouteIdentity, ajax_request: bool) -> Self {
        Self {
            route,
            session_id: None,
            session_data: Value::Object(Default::default()),
            has_session: false,
            current_user: CurrentUser::default(),
            utoken: None,
            ltoken: String::new(),
            csp_nonce: String::new(),
            locale: LocaleSelection::default(),
            theme: ThemeSelection::default(),
            ajax_request,
            extra: Default::default(),
        }
    }

    /// Attach a route-specific value to the rendered context.
    pub fn insert_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }
}
