// Configuration module
use plinth_api::{AppSettings, CookieKeys};
use plinth_auth::CookieConfig;
use plinth_store::BootstrapTargets;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub cookies: CookieSettings,
    pub databases: DatabaseSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub app: AppDefaults,
    pub logging: LoggingSettings,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Security settings: host allow-list, CSP source lists, response headers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Host allow-list patterns; a request failing all of them is rejected
    /// with HTTP 400 before dispatch
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
    /// Header that marks AJAX-style requests
    #[serde(default = "default_ajax_header")]
    pub ajax_header: String,
    /// Secure flag on cookies (disable only in development without TLS)
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,
    /// Sent only when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions_policy: Option<String>,
    #[serde(default)]
    pub csp_allowed_script: Vec<String>,
    #[serde(default)]
    pub csp_allowed_style: Vec<String>,
    #[serde(default)]
    pub csp_allowed_img: Vec<String>,
    #[serde(default)]
    pub csp_allowed_font: Vec<String>,
    #[serde(default)]
    pub csp_allowed_connect: Vec<String>,
    #[serde(default)]
    pub cors: CorsSettings,
}

/// CORS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub expose_headers: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// Cookie names; nothing in the pipeline hardcodes these
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    #[serde(default = "default_session_key")]
    pub session_key: String,
    #[serde(default = "default_utoken_key")]
    pub utoken_key: String,
    #[serde(default = "default_theme_key")]
    pub theme_key: String,
    #[serde(default = "default_theme_color_key")]
    pub theme_color_key: String,
    #[serde(default = "default_lang_key")]
    pub lang_key: String,
    #[serde(default = "default_tab_changes_key")]
    pub tab_changes_key: String,
}

/// Database targets: pwa (app/users/rbac), safe (sessions), files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub pwa_url: String,
    #[serde(default = "default_db_type")]
    pub pwa_type: String,
    pub safe_url: String,
    #[serde(default = "default_db_type")]
    pub safe_type: String,
    pub files_url: String,
    #[serde(default = "default_db_type")]
    pub files_type: String,
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: i64,
}

/// Application defaults: routes, locale, theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDefaults {
    #[serde(default = "default_comp_route_root")]
    pub comp_route_root: String,
    #[serde(default)]
    pub default_neutral_route: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_supported_locales")]
    pub supported_locales: Vec<String>,
    #[serde(default = "default_theme")]
    pub default_theme: String,
    #[serde(default = "default_theme_color")]
    pub default_theme_color: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub file_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Per-target level overrides
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            ajax_header: default_ajax_header(),
            cookie_secure: true,
            referrer_policy: default_referrer_policy(),
            permissions_policy: None,
            csp_allowed_script: Vec::new(),
            csp_allowed_style: Vec::new(),
            csp_allowed_img: Vec::new(),
            csp_allowed_font: Vec::new(),
            csp_allowed_connect: Vec::new(),
            cors: CorsSettings::default(),
        }
    }
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
            utoken_key: default_utoken_key(),
            theme_key: default_theme_key(),
            theme_color_key: default_theme_color_key(),
            lang_key: default_lang_key(),
            tab_changes_key: default_tab_changes_key(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
        }
    }
}

impl Default for AppDefaults {
    fn default() -> Self {
        Self {
            comp_route_root: default_comp_route_root(),
            default_neutral_route: String::new(),
            default_locale: default_locale(),
            supported_locales: default_supported_locales(),
            default_theme: default_theme(),
            default_theme_color: default_theme_color(),
        }
    }
}

// Default value functions
fn default_workers() -> usize {
    0
}

fn default_true() -> bool {
    true
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["localhost".to_string(), "127.0.0.1".to_string()]
}

fn default_ajax_header() -> String {
    "Requested-With-Ajax".to_string()
}

fn default_referrer_policy() -> String {
    "strict-origin-when-cross-origin".to_string()
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string()]
}

fn default_cors_headers() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_session_key() -> String {
    "plinth_session".to_string()
}

fn default_utoken_key() -> String {
    "plinth_utoken".to_string()
}

fn default_theme_key() -> String {
    "plinth_theme".to_string()
}

fn default_theme_color_key() -> String {
    "plinth_theme_color".to_string()
}

fn default_lang_key() -> String {
    "plinth_lang".to_string()
}

fn default_tab_changes_key() -> String {
    "plinth_tab_changes".to_string()
}

fn default_db_type() -> String {
    "sqlite".to_string()
}

fn default_session_ttl() -> i64 {
    60 * 60 * 24
}

fn default_comp_route_root() -> String {
    "app".to_string()
}

fn default_locale() -> String {
    "es".to_string()
}

fn default_supported_locales() -> Vec<String> {
    vec!["es".to_string(), "en".to_string()]
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_theme_color() -> String {
    "default".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        // Override with environment variables if present
        config.apply_env_overrides()?;

        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides for deployment-sensitive values
    ///
    /// Supported environment variables:
    /// - PLINTH_SERVER_HOST: Override server.host
    /// - PLINTH_SERVER_PORT: Override server.port
    /// - PLINTH_LOG_LEVEL: Override logging.level
    /// - PLINTH_LOG_FILE: Override logging.file_path
    /// - PLINTH_LOG_TO_CONSOLE: Override logging.log_to_console
    /// - PLINTH_DB_PWA_URL / PLINTH_DB_SAFE_URL / PLINTH_DB_FILES_URL
    ///
    /// Environment variables take precedence over config.toml values
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        use std::env;

        if let Ok(host) = env::var("PLINTH_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = env::var("PLINTH_SERVER_PORT") {
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid PLINTH_SERVER_PORT value: {}", port_str))?;
        }

        if let Ok(level) = env::var("PLINTH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(path) = env::var("PLINTH_LOG_FILE") {
            self.logging.file_path = path;
        }

        if let Ok(val) = env::var("PLINTH_LOG_TO_CONSOLE") {
            self.logging.log_to_console =
                val.to_lowercase() == "true" || val == "1" || val.to_lowercase() == "yes";
        }

        if let Ok(url) = env::var("PLINTH_DB_PWA_URL") {
            self.databases.pwa_url = url;
        }
        if let Ok(url) = env::var("PLINTH_DB_SAFE_URL") {
            self.databases.safe_url = url;
        }
        if let Ok(url) = env::var("PLINTH_DB_FILES_URL") {
            self.databases.files_url = url;
        }

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        if self.security.allowed_hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "security.allowed_hosts must contain at least one pattern"
            ));
        }

        if self.session.ttl_seconds <= 0 {
            return Err(anyhow::anyhow!("session.ttl_seconds must be positive"));
        }

        if !self.app.supported_locales.contains(&self.app.default_locale) {
            return Err(anyhow::anyhow!(
                "app.default_locale '{}' must be listed in app.supported_locales",
                self.app.default_locale
            ));
        }

        Ok(())
    }

    /// Dispatch settings for the API layer
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            comp_route_root: self.app.comp_route_root.clone(),
            ajax_header: self.security.ajax_header.clone(),
            default_neutral_route: self.app.default_neutral_route.clone(),
            cookie_keys: CookieKeys {
                session: self.cookies.session_key.clone(),
                utoken: self.cookies.utoken_key.clone(),
                theme: self.cookies.theme_key.clone(),
                theme_color: self.cookies.theme_color_key.clone(),
                lang: self.cookies.lang_key.clone(),
                tab_changes: self.cookies.tab_changes_key.clone(),
            },
            cookie_config: CookieConfig {
                secure: self.security.cookie_secure,
                ..CookieConfig::default()
            },
            session_ttl_seconds: self.session.ttl_seconds,
            default_locale: self.app.default_locale.clone(),
            supported_locales: self.app.supported_locales.clone(),
            default_theme: self.app.default_theme.clone(),
            default_theme_color: self.app.default_theme_color.clone(),
        }
    }

    /// Database targets for the bootstrap CLI
    pub fn bootstrap_targets(&self) -> BootstrapTargets {
        BootstrapTargets {
            pwa_url: self.databases.pwa_url.clone(),
            pwa_type: self.databases.pwa_type.clone(),
            safe_url: self.databases.safe_url.clone(),
            safe_type: self.databases.safe_type.clone(),
            files_url: self.databases.files_url.clone(),
            files_type: self.databases.files_type.clone(),
        }
    }
}

impl Default for ServerConfig {
    /// Default configuration (useful for testing and as CLI fallback)
    fn default() -> Self {
        ServerConfig {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: 0,
            },
            security: SecuritySettings::default(),
            cookies: CookieSettings::default(),
            databases: DatabaseSettings {
                pwa_url: "sqlite:./data/pwa.db".to_string(),
                pwa_type: "sqlite".to_string(),
                safe_url: "sqlite:./data/safe.db".to_string(),
                safe_type: "sqlite".to_string(),
                files_url: "sqlite:./data/files.db".to_string(),
                files_type: "sqlite".to_string(),
            },
            session: SessionSettings::default(),
            app: AppDefaults::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                file_path: "./logs/plinth.log".to_string(),
                log_to_console: true,
                format: "compact".to_string(),
                targets: HashMap::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = ServerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ServerConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_allowed_hosts_rejected() {
        let mut config = ServerConfig::default();
        config.security.allowed_hosts = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_locale_must_be_supported() {
        let mut config = ServerConfig::default();
        config.app.default_locale = "fr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override_server_host() {
        env::set_var("PLINTH_SERVER_HOST", "0.0.0.0");
        let mut config = ServerConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        env::remove_var("PLINTH_SERVER_HOST");
    }

    #[test]
    fn test_env_override_db_urls() {
        env::set_var("PLINTH_DB_PWA_URL", "postgres://db/pwa");
        let mut config = ServerConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.databases.pwa_url, "postgres://db/pwa");
        env::remove_var("PLINTH_DB_PWA_URL");
    }

    #[test]
    fn test_app_settings_carries_cookie_keys() {
        let mut config = ServerConfig::default();
        config.cookies.utoken_key = "custom_utoken".to_string();
        let settings = config.app_settings();
        assert_eq!(settings.cookie_keys.utoken, "custom_utoken");
        assert_eq!(settings.default_locale, "es");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [databases]
            pwa_url = "sqlite:./pwa.db"
            safe_url = "sqlite:./safe.db"
            files_url = "sqlite:./files.db"

            [logging]
            file_path = "./logs/test.log"
        "#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cookies.session_key, "plinth_session");
        assert_eq!(config.session.ttl_seconds, 86400);
        assert!(config.validate().is_ok());
    }
}
