//! Shared HTTP client construction.
//!
//! The backend authenticates with a session cookie set by the login call, so
//! every service must share one client (and therefore one cookie jar).

use anyhow::{Context, Result};

use crate::config::ApiConfig;

/// Build the cookie-carrying client used for all backend calls.
pub fn build_client(api: &ApiConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(api.request_timeout())
        .user_agent(concat!("growlab/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Join the backend base URL and an `/api/...` path without doubling slashes.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
