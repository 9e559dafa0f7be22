use crate::services::calendar_service::CalendarError;
use growlab_core::{AppError, AuthError, NetworkError};

impl From<CalendarError> for AppError {
    fn from(e: CalendarError) -> Self {
        match e {
            CalendarError::Http(401 | 403) => AppError::Auth(AuthError::SessionInvalid),
            CalendarError::Http(status) => AppError::Network(NetworkError::ServerError {
                status,
                message: format!("HTTP error! status: {}", status),
            }),
            CalendarError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            CalendarError::InvalidEvent(s) => AppError::Service(s),
            CalendarError::Cancelled => AppError::Service("Calendar request cancelled".into()),
        }
    }
}
