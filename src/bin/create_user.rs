//! CLI to create users in the project database.
//!
//! Validation runs before any database interaction; validation failures
//! exit with code 2, creation failures with code 1.

use clap::Parser;
use plinth_server::config::ServerConfig;
use plinth_store::{NewUser, SqlBackend, UserRepository};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Create a user in Plinth.
#[derive(Parser, Debug)]
#[command(name = "create_user")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create a user in Plinth", long_about = None)]
struct Cli {
    /// User display name (alias)
    name: String,

    /// User email
    email: String,

    /// User password
    password: String,

    /// Birthdate in ISO format, for example: 1990-05-20 or 1990-05-20T00:00:00
    birthdate: String,

    /// User locale
    #[arg(long = "locale", default_value = "es")]
    locale: String,

    /// Optional region value
    #[arg(long = "region", default_value = "")]
    region: String,

    /// Optional JSON text stored in user profile properties
    #[arg(long = "properties", default_value = "{}")]
    properties: String,

    /// Configuration file path
    #[arg(long = "config", default_value = "config.toml")]
    config: PathBuf,
}

/// Validate CLI input. Runs before any database call.
fn validate_args(cli: &Cli) -> Result<(), String> {
    if cli.name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }

    let email_pattern = regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .expect("email pattern is a valid regex");
    if !email_pattern.is_match(cli.email.trim()) {
        return Err("email format is invalid".to_string());
    }

    if cli.password.trim().is_empty() {
        return Err("password cannot be empty".to_string());
    }

    let is_iso_date = cli.birthdate.parse::<chrono::NaiveDate>().is_ok()
        || cli.birthdate.parse::<chrono::NaiveDateTime>().is_ok();
    if !is_iso_date {
        return Err("birthdate must be valid ISO format".to_string());
    }

    if !cli.properties.is_empty() && serde_json::from_str::<serde_json::Value>(&cli.properties).is_err()
    {
        return Err("properties must be valid JSON text".to_string());
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(err) = validate_args(&cli) {
        eprintln!("ERROR: {err}");
        return 2;
    }

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

    let backend =
        match SqlBackend::open(&config.databases.pwa_url, &config.databases.pwa_type).await {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "success": false,
                        "error": e.to_string(),
                    }))
                    .expect("error payload serializes")
                );
                return 1;
            }
        };

    let repo = UserRepository::new(backend);
    let new_user = NewUser {
        alias: cli.name.trim().to_string(),
        email: cli.email.trim().to_string(),
        password: cli.password.clone(),
        birthdate: cli.birthdate.clone(),
        locale: if cli.locale.trim().is_empty() {
            "es".to_string()
        } else {
            cli.locale.trim().to_string()
        },
        region: cli.region.trim().to_string(),
        properties: if cli.properties.trim().is_empty() {
            "{}".to_string()
        } else {
            cli.properties.trim().to_string()
        },
    };

    match repo.create_user(new_user).await {
        Ok(record) => {
            let result = json!({ "success": true, "user": record });
            println!(
                "{}",
                serde_json::to_string_pretty(&result).expect("result payload serializes")
            );
            0
        }
        Err(e) => {
            let result = json!({ "success": false, "error": e.to_string() });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&result).expect("error payload serializes")
            );
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(name: &str, email: &str, password: &str, birthdate: &str, properties: &str) -> Cli {
        Cli {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            birthdate: birthdate.to_string(),
            locale: "es".to_string(),
            region: String::new(),
            properties: properties.to_string(),
            config: PathBuf::from("config.toml"),
        }
    }

    #[test]
    fn test_valid_args() {
        let args = cli("Ada", "ada@example.com", "pw", "1990-05-20", "{}");
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_datetime_birthdate_accepted() {
        let args = cli("Ada", "ada@example.com", "pw", "1990-05-20T00:00:00", "{}");
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let args = cli("   ", "ada@example.com", "pw", "1990-05-20", "{}");
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_malformed_email_rejected() {
        for email in ["not-an-email", "a@b", "a b@c.d", "@c.d"] {
            let args = cli("Ada", email, "pw", "1990-05-20", "{}");
            assert!(validate_args(&args).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn test_empty_password_rejected() {
        let args = cli("Ada", "ada@example.com", "  ", "1990-05-20", "{}");
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_non_iso_birthdate_rejected() {
        for birthdate in ["20/05/1990", "yesterday", "1990-13-40"] {
            let args = cli("Ada", "ada@example.com", "pw", birthdate, "{}");
            assert!(validate_args(&args).is_err(), "{birthdate} should be rejected");
        }
    }

    #[test]
    fn test_malformed_properties_rejected() {
        let args = cli("Ada", "ada@example.com", "pw", "1990-05-20", "{not json");
        assert!(validate_args(&args).is_err());
    }
}
