//! Server lifecycle management helpers.
//!
//! Encapsulates the heavy lifting otherwise done in `main.rs`: connecting
//! the databases, building the component registry and shared state, wiring
//! the HTTP server, and running it to completion.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use log::{debug, info};
use plinth_api::{AppState, ComponentRegistry};
use plinth_store::{SqlBackend, SqlSessionStore, UserRepository};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::middleware;

/// Aggregated application components shared across the HTTP server.
pub struct ApplicationComponents {
    pub user_repo: Arc<UserRepository>,
    pub session_store: Arc<SqlSessionStore>,
    pub app_state: web::Data<AppState>,
}

/// The components this starter registers at startup.
///
/// A static registration table: each entry is a component name and the
/// neutral route it serves. No runtime discovery.
const REGISTERED_COMPONENTS: &[(&str, &str)] = &[
    ("cmp_0500_locale", "/component/cmp_0500_locale"),
    ("cmp_2300_ftoken", "/component/cmp_2300_ftoken"),
    ("cmp_5200_pwa", "/component/cmp_5200_pwa"),
    ("cmp_7050_dev_admin", "/component/cmp_7050_dev_admin"),
];

/// Connect databases, build repositories, registry, and shared state.
pub async fn bootstrap(config: &ServerConfig) -> Result<ApplicationComponents> {
    let phase_start = std::time::Instant::now();

    let pwa = Arc::new(
        SqlBackend::open(&config.databases.pwa_url, &config.databases.pwa_type).await?,
    );
    let safe = Arc::new(
        SqlBackend::open(&config.databases.safe_url, &config.databases.safe_type).await?,
    );
    info!(
        "Databases connected: pwa={}, safe={} ({:.2}ms)",
        config.databases.pwa_url,
        config.databases.safe_url,
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    let user_repo = Arc::new(UserRepository::new(pwa));
    let session_store = Arc::new(SqlSessionStore::new(safe, config.session.ttl_seconds));

    // Static component registration table. The name→UUID map must be fully
    // populated before the first dispatch.
    let mut registry = ComponentRegistry::new();
    for (name, route) in REGISTERED_COMPONENTS {
        registry.register_component(name, Uuid::new_v4(), route);
    }
    debug!("Component registry populated: {} components", registry.len());

    let app_state = web::Data::new(AppState::new(
        config.app_settings(),
        registry,
        session_store.clone(),
        user_repo.clone(),
    ));

    Ok(ApplicationComponents {
        user_repo,
        session_store,
        app_state,
    })
}

/// Run the HTTP server until termination.
pub async fn run(config: &ServerConfig, components: ApplicationComponents) -> Result<()> {
    let app_state = components.app_state.clone();
    let server_config = config.clone();

    let workers = if config.server.workers == 0 {
        num_cpus::get()
    } else {
        config.server.workers
    };

    info!("Listening on {}:{} ({} workers)", config.server.host, config.server.port, workers);

    HttpServer::new(move || {
        // Wraps run in reverse registration order: HostGuard (last) sees the
        // request first, SecurityHeaders (first) touches the response last.
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::SecurityHeaders::from_config(&server_config))
            .wrap(middleware::request_logger())
            .wrap(middleware::build_cors_from_config(&server_config))
            .wrap(middleware::HostGuard::from_config(&server_config))
            .configure(plinth_api::routes::configure_routes)
    })
    .workers(workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
