// Plinth server entrypoint
//!
//! The heavy lifting (database wiring, middleware, graceful shutdown) lives
//! in dedicated modules so this file remains a thin orchestrator.

use anyhow::Result;
use log::info;
use plinth_server::config::ServerConfig;
use plinth_server::lifecycle::{bootstrap, run};
use plinth_server::logging;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration (hard failure when the file is broken)
    let config_path = "config.toml";
    let config = match ServerConfig::from_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: Failed to load {}: {}", config_path, e);
            eprintln!("Server cannot start without valid configuration");
            std::process::exit(1);
        }
    };

    // Logging before any other side effects
    logging::init_logging(
        &config.logging.level,
        &config.logging.file_path,
        config.logging.log_to_console,
        &config.logging.targets,
        &config.logging.format,
    )?;

    info!("Plinth server v{}", env!("CARGO_PKG_VERSION"));
    info!("Host: {}  Port: {}", config.server.host, config.server.port);

    // Build application state and repositories
    let components = bootstrap(&config).await?;

    // Run HTTP server until termination signal is received
    run(&config, components).await
}
