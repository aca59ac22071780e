//! Bootstrap core databases for a clean installation.
//!
//! Creates or updates the schema in the pwa/safe/files databases and seeds
//! the fixed role set. Safe to re-run: the operation is idempotent.

use clap::Parser;
use plinth_server::config::ServerConfig;
use plinth_store::bootstrap_databases;
use std::path::PathBuf;

/// Create or update the DB schema required by Plinth.
#[derive(Parser, Debug)]
#[command(name = "bootstrap_db")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create or update DB schema required by Plinth", long_about = None)]
struct Cli {
    /// Override the pwa database URL
    #[arg(long = "db-pwa-url")]
    db_pwa_url: Option<String>,

    /// Override the pwa database type
    #[arg(long = "db-pwa-type")]
    db_pwa_type: Option<String>,

    /// Override the safe database URL
    #[arg(long = "db-safe-url")]
    db_safe_url: Option<String>,

    /// Override the safe database type
    #[arg(long = "db-safe-type")]
    db_safe_type: Option<String>,

    /// Override the files database URL
    #[arg(long = "db-files-url")]
    db_files_url: Option<String>,

    /// Override the files database type
    #[arg(long = "db-files-type")]
    db_files_type: Option<String>,

    /// Print only errors
    #[arg(long = "quiet")]
    quiet: bool,

    /// Configuration file path
    #[arg(long = "config", default_value = "config.toml")]
    config: PathBuf,
}

fn log(message: &str, quiet: bool) {
    if !quiet {
        println!("{message}");
    }
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    // Defaults come from the config file when present; flags override.
    let config = if cli.config.exists() {
        match ServerConfig::from_file(&cli.config) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("ERROR: {e}");
                return 1;
            }
        }
    } else {
        ServerConfig::default()
    };

    let mut targets = config.bootstrap_targets();
    if let Some(url) = cli.db_pwa_url {
        targets.pwa_url = url;
    }
    if let Some(db_type) = cli.db_pwa_type {
        targets.pwa_type = db_type.to_lowercase();
    }
    if let Some(url) = cli.db_safe_url {
        targets.safe_url = url;
    }
    if let Some(db_type) = cli.db_safe_type {
        targets.safe_type = db_type.to_lowercase();
    }
    if let Some(url) = cli.db_files_url {
        targets.files_url = url;
    }
    if let Some(db_type) = cli.db_files_type {
        targets.files_type = db_type.to_lowercase();
    }

    log("[pwa] setup app/user/rbac schema + seed roles", cli.quiet);
    log("[safe] setup session schema", cli.quiet);
    log("[files] probe connection", cli.quiet);

    match bootstrap_databases(&targets).await {
        Ok(()) => {
            log("bootstrap_db completed", cli.quiet);
            0
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            1
        }
    }
}
