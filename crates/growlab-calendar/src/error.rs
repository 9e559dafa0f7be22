//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// Backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http { status: u16, body: String },

    /// The request was superseded or the view went away. Not a failure.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { status: 401 | 403, .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Http { status, .. } => format!("HTTP error! status: {}", status),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::InvalidEventData(msg) => msg.clone(),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::NetworkError(_) => "Failed to load calendar events".to_string(),
        }
    }

    /// Cancellation is expected during navigation and should not be shown.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = CalendarError::Http {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert!(err.user_message().contains("500"));

        let err = CalendarError::Http {
            status: 401,
            body: String::new(),
        };
        assert!(err.user_message().contains("sign in"));

        let err = CalendarError::InvalidEventData("Please enter an event title".into());
        assert_eq!(err.user_message(), "Please enter an event title");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(CalendarError::Cancelled.is_cancelled());
        assert!(!CalendarError::ApiError("x".into()).is_cancelled());
    }
}
