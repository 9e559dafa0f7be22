use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming the env file to load (defaults to `.env.local`).
pub const ENV_FILE_VAR: &str = "ENV_FILE";
const DEFAULT_ENV_FILE: &str = ".env.local";

pub const API_BASE_URL_VAR: &str = "GROWLAB_API_BASE_URL";
pub const GOOGLE_CLIENT_ID_VAR: &str = "GROWLAB_GOOGLE_CLIENT_ID";
pub const GOOGLE_REDIRECT_URL_VAR: &str = "GROWLAB_GOOGLE_REDIRECT_URL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (session file lives here)
    pub config_dir: PathBuf,

    /// Backend API settings
    pub api: ApiConfig,

    /// Google OAuth client settings
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Route protection and session validation
    #[serde(default)]
    pub auth: AuthConfig,

    /// Notification settings
    #[serde(default)]
    pub alerts: AlertConfig,

    /// OAuth callback page timing
    #[serde(default)]
    pub callback: CallbackConfig,

    /// Calendar view settings
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend (`/api/...` paths are appended)
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Google OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Google OAuth client id
    pub client_id: String,
    /// Redirect URI registered with Google; also sent to the backend on exchange
    pub redirect_uri: String,
}

impl OAuthConfig {
    /// Check if credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_id.starts_with("YOUR_")
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: "YOUR_GOOGLE_CLIENT_ID".to_string(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path prefixes that require a valid session
    #[serde(default = "default_protected_routes")]
    pub protected_routes: Vec<String>,

    /// Session revalidation interval in seconds (default: 5 minutes)
    #[serde(default = "default_validate_interval_secs")]
    pub validate_interval_secs: u64,
}

fn default_protected_routes() -> Vec<String> {
    vec!["/calendar".to_string()]
}

fn default_validate_interval_secs() -> u64 {
    5 * 60
}

impl AuthConfig {
    pub fn validate_interval(&self) -> Duration {
        Duration::from_secs(self.validate_interval_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            protected_routes: default_protected_routes(),
            validate_interval_secs: default_validate_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// How long an alert stays visible, in milliseconds
    pub ttl_ms: u64,
}

impl AlertConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { ttl_ms: 3000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackConfig {
    /// Seconds counted down before the code exchange starts
    pub countdown_secs: u32,
    /// Delay between a successful exchange and the redirect, in milliseconds
    pub redirect_delay_ms: u64,
}

impl CallbackConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            redirect_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// User id sent with calendar requests
    pub user_id: String,
    /// IANA time zone used to compute month boundaries
    pub time_zone: String,
    /// Display color applied to fetched events
    pub event_color: String,
}

impl CalendarConfig {
    /// Parsed time zone, falling back to UTC when the name is unknown.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.time_zone.parse().unwrap_or(chrono_tz::UTC)
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            user_id: "test-user".to_string(),
            time_zone: "UTC".to_string(),
            event_color: "#3788d8".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("growlab");

        Self {
            config_dir,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            oauth: OAuthConfig::default(),
            auth: AuthConfig::default(),
            alerts: AlertConfig::default(),
            callback: CallbackConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    ///
    /// The env file (`ENV_FILE`, default `.env.local`) is loaded first and
    /// environment overrides are applied on top of the file contents.
    pub fn load() -> Result<Self> {
        load_env_file();
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file, creating a default one if missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_BASE_URL_VAR) {
            tracing::debug!("Using API base URL from {}", API_BASE_URL_VAR);
            self.api.base_url = url;
        }
        if let Some(id) = lookup(GOOGLE_CLIENT_ID_VAR) {
            self.oauth.client_id = id;
        }
        if let Some(uri) = lookup(GOOGLE_REDIRECT_URL_VAR) {
            self.oauth.redirect_uri = uri;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.api.base_url, "api.base_url", &mut result);
        validate_url(&self.oauth.redirect_uri, "oauth.redirect_uri", &mut result);

        if self.api.request_timeout_secs == 0 {
            result.add_error("api.request_timeout_secs", "Timeout must be greater than 0");
        }

        if self.auth.validate_interval_secs == 0 {
            result.add_error(
                "auth.validate_interval_secs",
                "Validation interval must be greater than 0",
            );
        }

        for route in &self.auth.protected_routes {
            if !route.starts_with('/') {
                result.add_error(
                    "auth.protected_routes",
                    format!("Route must start with '/': {}", route),
                );
            }
        }

        if self.alerts.ttl_ms == 0 {
            result.add_warning("alerts.ttl_ms", "Alerts will disappear immediately");
        }

        if self.calendar.time_zone.parse::<chrono_tz::Tz>().is_err() {
            result.add_error(
                "calendar.time_zone",
                format!("Unknown time zone: {}", self.calendar.time_zone),
            );
        }

        if !self.oauth.is_configured() {
            result.add_warning(
                "oauth",
                "Google OAuth not configured - sign-in will be unavailable",
            );
        }

        result
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("growlab");

        Ok(config_dir.join("config.toml"))
    }
}

fn load_env_file() {
    let env_file = std::env::var(ENV_FILE_VAR).unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
    match dotenvy::from_path(&env_file) {
        Ok(()) => tracing::info!("Loading environment variables from {}", env_file),
        Err(e) if e.not_found() => tracing::warn!("Environment file {} not found.", env_file),
        Err(e) => tracing::warn!("Failed to load environment file {}: {}", env_file, e),
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
