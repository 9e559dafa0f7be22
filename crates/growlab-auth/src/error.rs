//! Auth-specific error types.

use thiserror::Error;

use crate::callback::MISSING_CODE_MESSAGE;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization code not found")]
    MissingCode,

    /// Backend answered with a non-2xx status.
    #[error("HTTP error! Status: {status}{}", detail(.message))]
    Http { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(" ({})", m),
        _ => String::new(),
    }
}

impl AuthError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCode => MISSING_CODE_MESSAGE.to_string(),
            Self::Http { status, .. } if *status == 401 || *status == 403 => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Http { message: Some(m), .. } if !m.is_empty() => m.clone(),
            Self::Http { status, .. } => format!("Request failed with status {}", status),
            Self::InvalidResponse(_) => "Unexpected response from server".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether the backend explicitly rejected the session.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}
