//! Google sign-in link.
//!
//! The code exchange itself happens on the backend; the client only builds
//! the consent URL the sign-in page links to.

use growlab_core::OAuthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

const PROFILE_SCOPES: &str = "openid email profile";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

pub struct GoogleSignIn {
    pub client_id: String,
    pub redirect_uri: String,
}

impl GoogleSignIn {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn from_config(config: &OAuthConfig) -> Self {
        Self::new(config.client_id.clone(), config.redirect_uri.clone())
    }

    /// Generate the consent URL.
    /// Returns (url, state) where state should be verified on callback.
    pub fn authorization_url(&self) -> (String, String) {
        let state = uuid::Uuid::new_v4().to_string();
        let scopes = format!("{} {}", PROFILE_SCOPES, CALENDAR_SCOPE);

        let url = format!(
            concat!(
                "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
                "&access_type=offline&prompt=consent"
            ),
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(&state),
        );

        tracing::debug!(%state, "built google authorization url");
        (url, state)
    }
}
