//! Shared application state handed to handlers.

use std::sync::Arc;

use plinth_session::{RoleStore, SessionStore};

use crate::registry::ComponentRegistry;
use crate::settings::AppSettings;

/// Everything a handler needs to run the dispatch pipeline.
///
/// Built once in the server lifecycle and shared via `web::Data`; all
/// members are read-only after startup.
pub struct AppState {
    pub settings: AppSettings,
    pub registry: ComponentRegistry,
    pub sessions: Arc<dyn SessionStore>,
    pub roles: Arc<dyn RoleStore>,
}

impl AppState {
    pub fn new(
        settings: AppSettings,
        registry: ComponentRegistry,
        sessions: Arc<dyn SessionStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            settings,
            registry,
            sessions,
            roles,
        }
    }
}
