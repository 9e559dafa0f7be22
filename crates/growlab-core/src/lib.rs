pub mod alerts;
pub mod config;
pub mod error;
pub mod http;

pub use alerts::{AlertKind, AlertMessage, AlertStore};
pub use config::{
    AlertConfig, ApiConfig, AuthConfig, CalendarConfig, CallbackConfig, Config, OAuthConfig,
    ValidationResult,
};
pub use error::{AppError, AuthError, NetworkError};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("GrowLab core initialized");
    Ok(())
}
