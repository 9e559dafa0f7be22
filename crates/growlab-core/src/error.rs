//! Application-level error type shared by the view layer.
//!
//! Service crates keep their own error enums. The UI maps them into
//! [`AppError`] to pick a message fit for display.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Failures that have no better home (bad event data, cancelled work).
    #[error("Service error: {0}")]
    Service(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Service(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Backend reachability and status failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the server. Check your internet connection."
            }
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
        }
    }
}

/// Session failures surfaced to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session expired or invalid")]
    SessionInvalid,

    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::SessionInvalid => "Your session has expired. Please sign in again.",
            AuthError::SignOutFailed(_) => "Sign-out failed. Please try again.",
        }
    }
}
