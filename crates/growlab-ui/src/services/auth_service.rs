//! Auth backend: sign-out runs off the caller; results sent via mpsc.

use std::sync::Arc;

use growlab_auth::{AuthBackend, AuthError as BackendError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

/// Error type for auth operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Backend refused; carries the server's message when it sent one.
    SignOut(String),
    Network(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::SignOut(s) => write!(f, "Sign out failed: {}", s),
            AuthError::Network(s) => write!(f, "Network error: {}", s),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<BackendError> for AuthError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Http {
                message: Some(message),
                ..
            } => AuthError::SignOut(message),
            BackendError::Http { status, .. } => {
                AuthError::SignOut(format!("HTTP error! Status: {}", status))
            }
            other => AuthError::Network(other.to_string()),
        }
    }
}

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum AuthServiceMessage {
    /// Result of the sign-out call
    SignOutDone(Result<(), AuthError>),
}

/// Request sign-out asynchronously.
/// Sends `SignOutDone` on the channel when complete.
pub fn request_sign_out(
    tx: &UnboundedSender<AuthServiceMessage>,
    runtime: &Handle,
    backend: Arc<dyn AuthBackend>,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = backend.sign_out().await.map_err(AuthError::from);
        let _ = tx.send(AuthServiceMessage::SignOutDone(result));
    });
}
