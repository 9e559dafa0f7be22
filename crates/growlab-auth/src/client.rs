//! Backend client for the `/api/authorize` endpoints.

use async_trait::async_trait;
use growlab_core::http::endpoint;
use tracing::instrument;

use crate::error::AuthError;
use crate::types::{ErrorBody, LoginRequest, LoginResponse, UserRecord};

const LOGIN_PATH: &str = "/api/authorize/googleLogin";
const VALIDATE_PATH: &str = "/api/authorize/validate";
const SIGN_OUT_PATH: &str = "/api/authorize/googleSignOut";

/// Session operations the auth flows depend on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange an OAuth authorization code for a session and the signed-in user.
    async fn google_login(&self, code: &str, redirect_uri: &str) -> Result<UserRecord, AuthError>;

    /// Confirm the session cookie is still accepted.
    async fn validate(&self) -> Result<(), AuthError>;

    /// End the backend session.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// `client` should be the shared cookie-carrying client so the session
    /// cookie set at login is sent on later calls.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    async fn error_from(response: reqwest::Response) -> AuthError {
        let status = response.status().as_u16();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        AuthError::Http {
            status,
            message: body.into_message(),
        }
    }
}

#[async_trait]
impl AuthBackend for AuthClient {
    #[instrument(skip(self, code), level = "info")]
    async fn google_login(&self, code: &str, redirect_uri: &str) -> Result<UserRecord, AuthError> {
        let response = self
            .client
            .post(endpoint(&self.base_url, LOGIN_PATH))
            .json(&LoginRequest { code, redirect_uri })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("JSON parse error: {}", e)))?;
        tracing::debug!(email = %login.data.email, "google login succeeded");
        Ok(login.data)
    }

    #[instrument(skip(self), level = "debug")]
    async fn validate(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .get(endpoint(&self.base_url, VALIDATE_PATH))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    #[instrument(skip(self), level = "info")]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .post(endpoint(&self.base_url, SIGN_OUT_PATH))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}
